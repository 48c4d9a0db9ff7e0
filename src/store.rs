//! Read-only views of the host's flat stores.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::fingerprint::Fingerprint;

/// Key of one flat entity.
///
/// Entities of a definition use `{Definition}:{id}` (e.g. `User:1`).
/// Whole responses are stored under the fingerprint of their link.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(String);

impl EntityKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn for_entity(definition: &str, id: &str) -> Self {
        Self(format!("{}:{}", definition, id))
    }

    pub fn for_link(fingerprint: &Fingerprint) -> Self {
        Self(format!("link:{}", fingerprint))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for EntityKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Flat, normalized entities. No nesting: references are ids.
pub type EntityDictionary = BTreeMap<EntityKey, Value>;

/// A stored response: metadata plus its flat content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceEnvelope {
    #[serde(default)]
    pub content: Value,

    /// Status, timestamps, or whatever else the fetch layer records.
    #[serde(flatten)]
    pub meta: Map<String, Value>,
}

impl ResourceEnvelope {
    pub fn new(content: Value) -> Self {
        Self {
            content,
            meta: Map::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Same envelope, different content.
    pub fn with_content(&self, content: Value) -> Self {
        Self {
            content,
            meta: self.meta.clone(),
        }
    }
}

/// Resource envelopes keyed by the fingerprint of the link they answer.
pub type ResourceStore = BTreeMap<Fingerprint, ResourceEnvelope>;

/// Render a scalar id the way entity keys spell it.
///
/// Objects, arrays and null have no key form.
pub fn id_key_part(id: &Value) -> Option<String> {
    match id {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
