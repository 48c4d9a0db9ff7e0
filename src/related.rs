use crate::error::ResourceError;
use crate::fingerprint::fingerprint;
use crate::link::ResourceLink;
use crate::schema::resolve_ref;
use crate::state::ResourcesState;
use crate::store::ResourceEnvelope;

/// The link a schema-declared relation `rel` of `link` points at.
///
/// The related link reuses the resolved params of `link` unchanged; no
/// check is made that the relation's template accepts them.
pub fn related_link(
    link: &ResourceLink,
    rel: &str,
    state: &ResourcesState,
) -> Result<Option<ResourceLink>, ResourceError> {
    let resolved = state.service().resolve_resource_link(link, state.api())?;
    let schema = match resolve_ref(&resolved.resource_schema, state.definitions()) {
        Ok(Some((_, schema))) => schema,
        Ok(None) => return Ok(None),
        Err(e) => {
            tracing::debug!("resource schema for {:?} unresolved: {}", link.name, e);
            return Ok(None);
        }
    };
    let Some(name) = state.service().find_relation_link_name(schema, rel) else {
        tracing::debug!("no relation {:?} declared for link {:?}", rel, link.name);
        return Ok(None);
    };
    Ok(Some(ResourceLink::with_params(name, resolved.params)))
}

/// The stored resource behind relation `rel` of `link`, if fetched yet.
pub fn related_resource(
    link: &ResourceLink,
    rel: &str,
    state: &ResourcesState,
) -> Result<Option<ResourceEnvelope>, ResourceError> {
    let Some(related) = related_link(link, rel, state)? else {
        return Ok(None);
    };
    Ok(state.resources().get(&fingerprint(&related)).cloned())
}
