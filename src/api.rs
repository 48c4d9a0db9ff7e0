//! API description — path templates plus schema definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ResourceError;
use crate::link::{CanonicalLink, LinkParams, ResourceLink};

/// Path templates keyed by link name.
pub type Paths = BTreeMap<String, PathTemplate>;

/// Schema definitions keyed by definition name.
pub type Definitions = Map<String, Value>;

/// One declared endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathTemplate {
    /// URL template (e.g. `/users/{id}`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Static parameters every link to this endpoint carries.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: LinkParams,

    /// Response schema: `{"$ref": ..}` or `{"items": {"$ref": ..}}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,

    /// Anything else the description declares (method, tags, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PathTemplate {
    /// Fill `{param}` placeholders of `path`.
    ///
    /// Returns `None` when there is no path or a placeholder has no value.
    pub fn expand(&self, params: &LinkParams) -> Option<String> {
        let template = self.path.as_deref()?;
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let close = rest[open..].find('}')? + open;
            let key = &rest[open + 1..close];
            match params.get(key)? {
                Value::String(s) => out.push_str(s),
                Value::Null => return None,
                other => out.push_str(&other.to_string()),
            }
            rest = &rest[close + 1..];
        }
        out.push_str(rest);
        Some(out)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiDescription {
    #[serde(default)]
    pub paths: Paths,

    #[serde(default)]
    pub definitions: Definitions,
}

impl ApiDescription {
    pub fn new(paths: Paths, definitions: Definitions) -> Self {
        Self { paths, definitions }
    }

    pub fn from_json(json: &str) -> Result<Self, ResourceError> {
        serde_json::from_str(json).map_err(|e| ResourceError::Config(e.to_string()))
    }

    pub fn path(&self, name: &str) -> Option<&PathTemplate> {
        self.paths.get(name)
    }
}

/// Canonicalize `link` against its path template.
///
/// Static template params are applied first and supplied params override
/// them. A name without a template yields the link's own content.
pub fn normalize_link(link: &ResourceLink, paths: &Paths) -> CanonicalLink {
    let mut params = paths
        .get(&link.name)
        .map(|template| template.params.clone())
        .unwrap_or_default();
    params.extend(link.params.iter().map(|(k, v)| (k.clone(), v.clone())));
    CanonicalLink(ResourceLink::with_params(link.name.clone(), params))
}
