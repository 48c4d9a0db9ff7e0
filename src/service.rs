use serde_json::Value;

use crate::api::{ApiDescription, normalize_link};
use crate::error::ResourceError;
use crate::link::{ResolvedLink, ResourceLink};
use crate::schema;

/// Resolution strategy supplied by the host.
///
/// A state cannot be built without one, so the contract is checked once
/// at construction rather than on every resolution.
pub trait ResourcesService {
    /// Turn a link into the schema of the resource it names plus the params
    /// it resolves with.
    fn resolve_resource_link(
        &self,
        link: &ResourceLink,
        api: &ApiDescription,
    ) -> Result<ResolvedLink, ResourceError>;

    /// Link template name declared for relation `rel` on `schema`.
    fn find_relation_link_name(&self, schema: &Value, rel: &str) -> Option<String> {
        schema::find_relation_link_name(schema, rel)
    }
}

/// Resolves links straight from the path templates of the description.
#[derive(Debug, Clone, Copy, Default)]
pub struct HyperSchemaService;

impl ResourcesService for HyperSchemaService {
    fn resolve_resource_link(
        &self,
        link: &ResourceLink,
        api: &ApiDescription,
    ) -> Result<ResolvedLink, ResourceError> {
        let template = api
            .path(&link.name)
            .ok_or_else(|| ResourceError::UnknownLink(link.name.clone()))?;
        let resource_schema = template
            .schema
            .clone()
            .ok_or_else(|| ResourceError::MissingResourceSchema(link.name.clone()))?;
        let canonical = normalize_link(link, &api.paths);
        Ok(ResolvedLink {
            resource_schema,
            params: canonical.into_link().params,
        })
    }
}
