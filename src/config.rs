use serde::{Deserialize, Serialize};

use crate::error::ResourceError;

/// Id property for definitions that declare none.
pub const DEFAULT_ID_PROPERTY: &str = "id";

/// Tuning for the selector registry and denormalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourcesConfig {
    /// Entries kept per factory cache. `None` never evicts: every distinct
    /// link stays cached for the life of the registry.
    pub cache_capacity: Option<usize>,

    /// Hop depth used when a caller does not ask for one.
    pub default_max_level: usize,

    /// Id property for definitions that declare no `x-id-property`.
    pub id_property: String,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            cache_capacity: None,
            default_max_level: 1,
            id_property: DEFAULT_ID_PROPERTY.into(),
        }
    }
}

impl ResourcesConfig {
    pub fn bounded(capacity: usize) -> Self {
        Self {
            cache_capacity: Some(capacity),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ResourceError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ResourceError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ResourceError> {
        if self.cache_capacity == Some(0) {
            return Err(ResourceError::Config("cacheCapacity must be at least 1".into()));
        }
        if self.id_property.is_empty() {
            return Err(ResourceError::Config("idProperty must not be empty".into()));
        }
        Ok(())
    }
}
