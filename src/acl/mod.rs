// Copyright (c) 2025 - Cowboy AI, Inc.
//! Assignee ACL Document
//!
//! The access-control list for one domain is a single XML document embedded
//! in the hypervisor's free-form metadata slot under a private namespace:
//!
//! ```text
//! <assignees>
//!   <assignee type="administrator">alice</assignee>
//!   <assignee type="user">bob</assignee>
//! </assignees>
//! ```
//!
//! The root holds zero or more assignee elements in insertion order; order is
//! not semantically significant to readers. The document does not exist until
//! the first write, and every write resends the whole document. This module
//! owns parsing, mutation and serialization of that sub-schema and nothing
//! else; it never talks to the connector.

use std::fmt::Write as _;
use std::str::FromStr;

use thiserror::Error;

use crate::domain::{Assignee, AssigneeType};

/// Private namespace URI the document is stored under
pub const ACL_METADATA_NAMESPACE: &str = "http://vmagent.dev/xmlns/assignees/1.0";

/// Namespace qualifier recorded alongside the document
pub const ACL_METADATA_QUALIFIER: &str = "assignees";

/// Failures while parsing a stored ACL document
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AclParseError {
    /// The fragment has no `<assignees>` root element
    #[error("document has no <assignees> root element")]
    MissingRoot,

    /// An element opened but never closed
    #[error("unterminated <{0}> element")]
    Unterminated(String),

    /// An assignee element carries no type attribute
    #[error("assignee element for \"{0}\" is missing the type attribute")]
    MissingType(String),

    /// An assignee element carries an unrecognized type attribute
    #[error("assignee element carries unknown type \"{0}\"")]
    UnknownType(String),
}

/// In-memory form of one domain's ACL document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AclDocument {
    records: Vec<Assignee>,
}

impl AclDocument {
    /// The empty document synthesized for domains with no prior write
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a stored document.
    ///
    /// Accepts the serialized forms this module produces plus surrounding
    /// whitespace, an optional XML declaration, and namespace attributes on
    /// the root.
    pub fn parse(xml: &str) -> Result<Self, AclParseError> {
        let mut rest = xml.trim();

        // Optional declaration
        if let Some(stripped) = rest.strip_prefix("<?xml") {
            let end = stripped.find("?>").ok_or(AclParseError::MissingRoot)?;
            rest = stripped[end + 2..].trim_start();
        }

        let root_start = rest.find("<assignees").ok_or(AclParseError::MissingRoot)?;
        let after_root = &rest[root_start + "<assignees".len()..];
        let open_end = after_root
            .find('>')
            .ok_or_else(|| AclParseError::Unterminated("assignees".to_string()))?;

        // Self-closing root is the empty document
        if after_root[..open_end].ends_with('/') {
            return Ok(Self::empty());
        }

        let body = &after_root[open_end + 1..];
        let body_end = body
            .find("</assignees>")
            .ok_or_else(|| AclParseError::Unterminated("assignees".to_string()))?;

        let mut records = Vec::new();
        let mut cursor = &body[..body_end];

        while let Some(pos) = cursor.find("<assignee") {
            let after = &cursor[pos + "<assignee".len()..];

            // Require a delimiter so `<assignees` never matches
            match after.as_bytes().first() {
                Some(b' ' | b'\t' | b'\n' | b'\r' | b'>' | b'/') => {}
                _ => {
                    cursor = after;
                    continue;
                }
            }

            let tag_end = after
                .find('>')
                .ok_or_else(|| AclParseError::Unterminated("assignee".to_string()))?;
            let attrs = &after[..tag_end];

            if attrs.ends_with('/') {
                // Self-closing assignee: no text content, so no user
                let ty = parse_type_attribute(attrs.trim_end_matches('/'), "")?;
                records.push(Assignee::new("", ty));
                cursor = &after[tag_end + 1..];
                continue;
            }

            let text_region = &after[tag_end + 1..];
            let close = text_region
                .find("</assignee>")
                .ok_or_else(|| AclParseError::Unterminated("assignee".to_string()))?;
            let user = unescape(&text_region[..close]);
            let ty = parse_type_attribute(attrs, &user)?;

            records.push(Assignee::new(user, ty));
            cursor = &text_region[close + "</assignee>".len()..];
        }

        Ok(Self { records })
    }

    /// Records in document order
    pub fn records(&self) -> &[Assignee] {
        &self.records
    }

    /// Consume the document, yielding its records
    pub fn into_records(self) -> Vec<Assignee> {
        self.records
    }

    /// Record for `user`, matched by exact text content
    pub fn find(&self, user: &str) -> Option<&Assignee> {
        self.records.iter().find(|r| r.user == user)
    }

    /// Remove any existing record for `user` and append a fresh one.
    ///
    /// Returns `true` when no record existed (create), `false` when one was
    /// replaced (update). Remove-then-insert keeps at most one record per
    /// user without a storage-level uniqueness constraint.
    pub fn upsert(&mut self, user: &str, assignee_type: AssigneeType) -> bool {
        let created = !self.remove(user);
        self.records.push(Assignee::new(user, assignee_type));
        created
    }

    /// Remove the record for `user`, reporting whether one existed
    pub fn remove(&mut self, user: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.user != user);
        self.records.len() != before
    }

    /// Serialize the whole document.
    ///
    /// Writers always resend this full form, never a diff.
    pub fn to_xml(&self) -> String {
        if self.records.is_empty() {
            return "<assignees/>".to_string();
        }

        let mut out = String::from("<assignees>\n");
        for record in &self.records {
            // Write to a String cannot fail
            let _ = writeln!(
                out,
                "  <assignee type=\"{}\">{}</assignee>",
                record.assignee_type,
                escape(&record.user),
            );
        }
        out.push_str("</assignees>");
        out
    }
}

fn parse_type_attribute(attrs: &str, user: &str) -> Result<AssigneeType, AclParseError> {
    let value = find_attribute(attrs, "type")
        .ok_or_else(|| AclParseError::MissingType(user.to_string()))?;
    let value = unescape(&value);
    AssigneeType::from_str(&value).map_err(|_| AclParseError::UnknownType(value))
}

/// Scan an opening-tag attribute region for `name="value"` or `name='value'`
fn find_attribute(attrs: &str, name: &str) -> Option<String> {
    let mut search = attrs;
    while let Some(pos) = search.find(name) {
        let before_ok = pos == 0
            || search[..pos]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_whitespace());
        let after = &search[pos + name.len()..];
        let after_eq = after.trim_start();

        if before_ok {
            if let Some(rest) = after_eq.strip_prefix('=') {
                let rest = rest.trim_start();
                let quote = rest.chars().next()?;
                if quote == '"' || quote == '\'' {
                    let value = &rest[1..];
                    let end = value.find(quote)?;
                    return Some(value[..end].to_string());
                }
            }
        }
        search = &search[pos + name.len()..];
    }
    None
}

/// Escape text content and attribute values for embedding
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Decode the five predefined entities; anything else passes through
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let (decoded, consumed) = if tail.starts_with("&amp;") {
            ('&', 5)
        } else if tail.starts_with("&lt;") {
            ('<', 4)
        } else if tail.starts_with("&gt;") {
            ('>', 4)
        } else if tail.starts_with("&quot;") {
            ('"', 6)
        } else if tail.starts_with("&apos;") {
            ('\'', 6)
        } else {
            ('&', 1)
        };
        out.push(decoded);
        rest = &tail[consumed..];
    }
    out.push_str(rest);
    out
}
