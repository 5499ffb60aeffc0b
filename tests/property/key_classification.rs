// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Domain Key Classification
//!
//! Resolution dispatch hinges entirely on the classification of the caller's
//! key, so it must be total and must recognize exactly the canonical
//! 8-4-4-4-12 hexadecimal pattern.

use proptest::prelude::*;

use vmagent::domain::{DomainKey, LookupMethod};

/// Strategy producing canonical UUID strings
fn canonical_uuid() -> impl Strategy<Value = String> {
    "[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}"
}

proptest! {
    /// Every canonical UUID string classifies as a UUID key
    #[test]
    fn canonical_uuids_classify_as_uuid(key in canonical_uuid()) {
        let classified = DomainKey::classify(&key);
        prop_assert_eq!(classified.method(), LookupMethod::Uuid);
    }

    /// Classification is total: no input panics, and anything that is not
    /// 36 bytes long is a name
    #[test]
    fn classification_never_panics(key in ".*") {
        let classified = DomainKey::classify(&key);
        if key.len() != 36 {
            prop_assert_eq!(classified.method(), LookupMethod::Name);
        }
    }

    /// Perturbing any single hyphen position off the canonical layout turns
    /// the key into a name
    #[test]
    fn broken_hyphen_layout_is_a_name(key in canonical_uuid(), pos in 0usize..36) {
        let mut bytes = key.into_bytes();
        let is_hyphen_slot = matches!(pos, 8 | 13 | 18 | 23);
        bytes[pos] = if is_hyphen_slot { b'0' } else { b'-' };
        let perturbed = String::from_utf8(bytes).unwrap();

        let classified = DomainKey::classify(&perturbed);
        prop_assert_eq!(classified.method(), LookupMethod::Name);
    }

    /// The display form of a classified key always round-trips the
    /// classification
    #[test]
    fn display_is_stable_under_reclassification(key in canonical_uuid()) {
        let first = DomainKey::classify(&key);
        let second = DomainKey::classify(&first.to_string());
        prop_assert_eq!(first.method(), second.method());
    }
}
