//! Content-addressed link identity.
//!
//! ```text
//! SHA-256(canonical_bytes(link)) → Fingerprint
//! ```
//!
//! The canonical encoding is tagged and length-prefixed, with object keys
//! sorted at every nesting level, so two links with equal content always
//! produce the same bytes regardless of how their maps were built.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::link::ResourceLink;

/// Deterministic identity of a link's `{name, params}` content.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of(link: &ResourceLink) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(canonical_bytes(link));
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lower-case hex encoding.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..16])
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Shorthand for [`Fingerprint::of`].
pub fn fingerprint(link: &ResourceLink) -> Fingerprint {
    Fingerprint::of(link)
}

// ---------------------------------------------------------------------------
// Canonical byte encoding
// ---------------------------------------------------------------------------

const TAG_NULL: u8 = 0x00;
const TAG_FALSE: u8 = 0x01;
const TAG_TRUE: u8 = 0x02;
const TAG_NUMBER: u8 = 0x03;
const TAG_STRING: u8 = 0x04;
const TAG_ARRAY: u8 = 0x05;
const TAG_OBJECT: u8 = 0x06;

fn canonical_bytes(link: &ResourceLink) -> Vec<u8> {
    let mut out = Vec::with_capacity(64);
    write_str(&mut out, &link.name);
    write_len(&mut out, link.params.len());
    // BTreeMap iterates in key order.
    for (key, value) in &link.params {
        write_str(&mut out, key);
        write_value(&mut out, value);
    }
    out
}

fn write_len(out: &mut Vec<u8>, len: usize) {
    out.extend_from_slice(&(len as u64).to_be_bytes());
}

fn write_str(out: &mut Vec<u8>, s: &str) {
    write_len(out, s.len());
    out.extend_from_slice(s.as_bytes());
}

fn write_value(out: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Null => out.push(TAG_NULL),
        Value::Bool(false) => out.push(TAG_FALSE),
        Value::Bool(true) => out.push(TAG_TRUE),
        Value::Number(n) => {
            out.push(TAG_NUMBER);
            write_str(out, &n.to_string());
        }
        Value::String(s) => {
            out.push(TAG_STRING);
            write_str(out, s);
        }
        Value::Array(items) => {
            out.push(TAG_ARRAY);
            write_len(out, items.len());
            for item in items {
                write_value(out, item);
            }
        }
        Value::Object(map) => {
            out.push(TAG_OBJECT);
            write_len(out, map.len());
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            for (key, item) in entries {
                write_str(out, key);
                write_value(out, item);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::{BTreeMap, HashSet};

    #[test]
    fn equal_links_equal_fingerprints() {
        let a = ResourceLink::new("getUser").with_param("id", 1);
        let b = ResourceLink::new("getUser").with_param("id", 1);
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn nested_object_key_order_is_irrelevant() {
        let a = ResourceLink::new("search").with_param("filter", json!({ "a": 1, "b": [true, null] }));
        let b = ResourceLink::new("search").with_param("filter", json!({ "b": [true, null], "a": 1 }));
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn value_type_is_part_of_identity() {
        let number = ResourceLink::new("getUser").with_param("id", 1);
        let string = ResourceLink::new("getUser").with_param("id", "1");
        assert_ne!(fingerprint(&number), fingerprint(&string));
    }

    #[test]
    fn name_and_param_boundaries_do_not_alias() {
        // "ab" + {"c": ""} must differ from "a" + {"bc": ""}.
        let a = ResourceLink::new("ab").with_param("c", "");
        let b = ResourceLink::new("a").with_param("bc", "");
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn empty_link_is_stable() {
        assert_eq!(
            fingerprint(&ResourceLink::default()),
            fingerprint(&ResourceLink::default())
        );
    }

    #[test]
    fn hex_is_64_lowercase_chars() {
        let hex = fingerprint(&ResourceLink::new("x")).to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn no_collisions_across_page_corpus() {
        let mut seen = HashSet::new();
        for page in 0..10_000u32 {
            let link = ResourceLink::new("list").with_param("page", page);
            assert!(seen.insert(fingerprint(&link)), "collision at page {}", page);
        }
    }

    proptest! {
        #[test]
        fn insertion_order_never_matters(
            name in "[a-zA-Z]{1,12}",
            entries in proptest::collection::btree_map("[a-z]{1,6}", any::<i64>(), 0..8),
        ) {
            let mut forward = serde_json::Map::new();
            let mut params_forward = BTreeMap::new();
            for (k, v) in &entries {
                forward.insert(k.clone(), json!(v));
                params_forward.insert(k.clone(), json!(v));
            }
            let mut backward = serde_json::Map::new();
            let mut params_backward = BTreeMap::new();
            for (k, v) in entries.iter().rev() {
                backward.insert(k.clone(), json!(v));
                params_backward.insert(k.clone(), json!(v));
            }
            params_forward.insert("filter".to_string(), Value::Object(forward));
            params_backward.insert("filter".to_string(), Value::Object(backward));

            let a = ResourceLink::with_params(name.clone(), params_forward);
            let b = ResourceLink::with_params(name, params_backward);
            prop_assert_eq!(fingerprint(&a), fingerprint(&b));
        }

        #[test]
        fn differing_param_values_differ(name in "[a-z]{1,8}", x in any::<i64>(), y in any::<i64>()) {
            prop_assume!(x != y);
            let a = ResourceLink::new(name.clone()).with_param("id", x);
            let b = ResourceLink::new(name).with_param("id", y);
            prop_assert_ne!(fingerprint(&a), fingerprint(&b));
        }
    }
}
