// Copyright (c) 2025 - Cowboy AI, Inc.
//! Domain Key Value Object
//!
//! A caller-supplied domain key is either a canonical UUID or a name; the
//! classification decides which connector lookup the resolver dispatches.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which connector lookup a key was (or will be) resolved through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupMethod {
    /// Lookup by UUID string
    Uuid,
    /// Lookup by domain name
    Name,
    /// Lookup by numeric id (active domains only)
    Id,
}

impl fmt::Display for LookupMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupMethod::Uuid => write!(f, "uuid"),
            LookupMethod::Name => write!(f, "name"),
            LookupMethod::Id => write!(f, "id"),
        }
    }
}

/// Classified domain key
///
/// A key matching the canonical 8-4-4-4-12 hexadecimal pattern classifies as
/// [`DomainKey::Uuid`]; every other string classifies as [`DomainKey::Name`].
/// Only the canonical hyphenated form counts — braced, simple and URN UUID
/// renderings are treated as names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainKey {
    /// Canonical UUID key
    Uuid(Uuid),
    /// Name key
    Name(String),
}

impl DomainKey {
    /// Classify a caller-supplied key
    pub fn classify(key: &str) -> Self {
        if has_canonical_shape(key) {
            if let Ok(uuid) = Uuid::parse_str(key) {
                return DomainKey::Uuid(uuid);
            }
        }
        DomainKey::Name(key.to_string())
    }

    /// The lookup method this key dispatches to
    pub fn method(&self) -> LookupMethod {
        match self {
            DomainKey::Uuid(_) => LookupMethod::Uuid,
            DomainKey::Name(_) => LookupMethod::Name,
        }
    }
}

impl fmt::Display for DomainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainKey::Uuid(uuid) => write!(f, "{uuid}"),
            DomainKey::Name(name) => write!(f, "{name}"),
        }
    }
}

/// Canonical 8-4-4-4-12 shape: 36 bytes, hyphens at fixed offsets, hex
/// everywhere else.
fn has_canonical_shape(key: &str) -> bool {
    let bytes = key.as_bytes();
    if bytes.len() != 36 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, &b)| match i {
        8 | 13 | 18 | 23 => b == b'-',
        _ => b.is_ascii_hexdigit(),
    })
}
