//! Link descriptors — `{name, params}` identifiers of endpoint instances.

use std::collections::BTreeMap;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameters of a link, ordered by key so equality is structural.
pub type LinkParams = BTreeMap<String, Value>;

/// Identifies one logical endpoint instance.
///
/// `Default` is the empty descriptor used wherever a caller has no link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLink {
    pub name: String,

    #[serde(default)]
    pub params: LinkParams,
}

impl ResourceLink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: LinkParams::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_params(name: impl Into<String>, params: LinkParams) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.params.is_empty()
    }
}

/// A link normalized against its path template.
///
/// Only `api::normalize_link` creates these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CanonicalLink(pub(crate) ResourceLink);

impl CanonicalLink {
    pub fn as_link(&self) -> &ResourceLink {
        &self.0
    }

    pub fn into_link(self) -> ResourceLink {
        self.0
    }
}

impl Deref for CanonicalLink {
    type Target = ResourceLink;

    fn deref(&self) -> &ResourceLink {
        &self.0
    }
}

/// Output of a resolution strategy: the schema describing the resource
/// plus the params the endpoint was resolved with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLink {
    pub resource_schema: Value,

    #[serde(default)]
    pub params: LinkParams,
}
