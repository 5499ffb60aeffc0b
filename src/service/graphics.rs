// Copyright (c) 2025 - Cowboy AI, Inc.
//! Graphics Console Password
//!
//! Sets a time-limited password on the domain's graphics device by mutating
//! the single graphics element of the live XML description and pushing it
//! back as a live device update. The persisted definition is untouched, so a
//! previously persisted password applies again after a restart.

use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use crate::acl::escape;
use crate::connector::device_flags;
use crate::errors::{VmServiceError, VmServiceResult};
use crate::service::resolve::DomainResolver;

/// Expiry stamp layout: no sub-second precision, no timezone suffix
const VALID_TO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Live graphics-device password mutation
pub struct GraphicsPasswordManager {
    resolver: DomainResolver,
}

impl GraphicsPasswordManager {
    /// Create a manager over the shared resolver
    pub fn new(resolver: DomainResolver) -> Self {
        Self { resolver }
    }

    /// Set `password` on the domain's graphics device, expiring after
    /// `valid_for`.
    ///
    /// Fails with `GraphicsDeviceConflict` unless the live description holds
    /// exactly one graphics element.
    pub async fn set_password(
        &self,
        key: &str,
        password: &str,
        valid_for: Duration,
    ) -> VmServiceResult<()> {
        let dom = self.resolver.resolve(key).await?;
        let xml = dom.xml_desc().await?;

        let element = extract_graphics_element(&xml)?;

        let valid_for = chrono::Duration::from_std(valid_for)
            .map_err(|_| VmServiceError::InvalidArgument("validity period out of range".into()))?;
        let valid_to = (Utc::now() + valid_for).format(VALID_TO_FORMAT).to_string();

        let element = upsert_attribute(&element, "passwd", password);
        let element = upsert_attribute(&element, "passwd-valid-to", &valid_to);

        debug!(key = %key, valid_to = %valid_to, "Updating graphics password");
        dom.update_device(&element, device_flags::MODIFY_LIVE).await?;
        Ok(())
    }
}

/// Extract the single graphics element from a domain description.
///
/// Zero or more than one graphics element is a structural conflict the
/// caller must resolve in the domain definition.
fn extract_graphics_element(xml: &str) -> VmServiceResult<String> {
    let mut found: Vec<String> = Vec::new();
    let mut offset = 0;

    while let Some(pos) = xml[offset..].find("<graphics") {
        let start = offset + pos;
        let after = &xml[start + "<graphics".len()..];

        // Delimiter check so names sharing the prefix never match
        match after.as_bytes().first() {
            Some(b' ' | b'\t' | b'\n' | b'\r' | b'>' | b'/') => {}
            _ => {
                offset = start + "<graphics".len();
                continue;
            }
        }

        let tag_end_rel = after
            .find('>')
            .ok_or_else(|| VmServiceError::MetadataParse("unterminated graphics element".into()))?;
        let tag_end = start + "<graphics".len() + tag_end_rel;

        if xml[..tag_end].ends_with('/') {
            found.push(xml[start..=tag_end].to_string());
            offset = tag_end + 1;
        } else {
            let close_rel = xml[tag_end + 1..].find("</graphics>").ok_or_else(|| {
                VmServiceError::MetadataParse("unterminated graphics element".into())
            })?;
            let end = tag_end + 1 + close_rel + "</graphics>".len();
            found.push(xml[start..end].to_string());
            offset = end;
        }
    }

    if found.len() == 1 {
        Ok(found.remove(0))
    } else {
        Err(VmServiceError::GraphicsDeviceConflict(found.len()))
    }
}

/// Set or replace an attribute on the element's opening tag
fn upsert_attribute(element: &str, name: &str, value: &str) -> String {
    let escaped = escape(value);

    let Some(tag_end) = element.find('>') else {
        return element.to_string();
    };
    let (tag, rest) = element.split_at(tag_end);

    if let Some((vstart, vend)) = attribute_value_span(tag, name) {
        format!("{}{}{}{}", &tag[..vstart], escaped, &tag[vend..], rest)
    } else {
        let insert_at = if tag.ends_with('/') {
            tag.len() - 1
        } else {
            tag.len()
        };
        format!(
            "{} {}=\"{}\"{}{}",
            tag[..insert_at].trim_end(),
            name,
            escaped,
            &tag[insert_at..],
            rest
        )
    }
}

/// Byte span of the quoted value of `name` within an opening tag, if present
fn attribute_value_span(tag: &str, name: &str) -> Option<(usize, usize)> {
    let mut offset = 0;

    while let Some(pos) = tag[offset..].find(name) {
        let start = offset + pos;
        let before_ok = tag[..start]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_whitespace());
        let after = &tag[start + name.len()..];
        let trimmed = after.trim_start();

        if before_ok {
            if let Some(eq_rest) = trimmed.strip_prefix('=') {
                let value_part = eq_rest.trim_start();
                if let Some(quote) = value_part.chars().next() {
                    if quote == '"' || quote == '\'' {
                        let ws_before_eq = after.len() - trimmed.len();
                        let ws_after_eq = eq_rest.len() - value_part.len();
                        let vstart =
                            start + name.len() + ws_before_eq + 1 + ws_after_eq + 1;
                        let vlen = value_part[1..].find(quote)?;
                        return Some((vstart, vstart + vlen));
                    }
                }
            }
        }
        offset = start + name.len();
    }
    None
}
