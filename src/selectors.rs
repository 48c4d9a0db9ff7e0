//! Memoized selector factories.
//!
//! Each factory maps a link (plus a depth or relation name where needed)
//! to a [`Selector`]. Structurally equal inputs return the very same
//! `Rc<Selector>`, so callers can compare accessors by pointer. Caches are
//! keyed by the link [`Fingerprint`] and bounded by
//! [`ResourcesConfig::cache_capacity`]; an evicted entry is rebuilt as a
//! new selector on its next request.

use std::rc::Rc;

use serde_json::Value;

use crate::api::{Definitions, Paths, normalize_link};
use crate::cache::MemoCache;
use crate::config::ResourcesConfig;
use crate::denormalize::Denormalizer;
use crate::error::ResourceError;
use crate::fingerprint::{Fingerprint, fingerprint};
use crate::link::{CanonicalLink, ResolvedLink, ResourceLink};
use crate::related;
use crate::schema::find_resource_schema;
use crate::selector::Selector;
use crate::service::ResourcesService;
use crate::state::{ResourcesState, Slice};
use crate::store::{EntityKey, ResourceEnvelope};

pub type NormalizedLinkSelector = Rc<Selector<CanonicalLink>>;
pub type ResolvedLinkSelector = Rc<Selector<Result<ResolvedLink, ResourceError>>>;
pub type ResourceSelector = Rc<Selector<Option<ResourceEnvelope>>>;
pub type ResourceDataSelector = Rc<Selector<Option<Value>>>;
pub type ResourceSchemaSelector = Rc<Selector<Option<Value>>>;
pub type RelatedResourceSelector = Rc<Selector<Result<Option<ResourceEnvelope>, ResourceError>>>;

const NORMALIZED_DEPS: &[Slice] = &[Slice::Paths];
const RESOLVED_DEPS: &[Slice] = &[Slice::Service, Slice::Paths, Slice::Definitions];
const RESOURCE_DEPS: &[Slice] = &[Slice::Resources];
const RESOURCE_DATA_DEPS: &[Slice] = &[Slice::Entities];
const SCHEMA_DEPS: &[Slice] = &[Slice::Paths, Slice::Definitions];
const DENORMALIZED_DEPS: &[Slice] = &[
    Slice::Paths,
    Slice::Definitions,
    Slice::Resources,
    Slice::Entities,
];
const RELATED_DEPS: &[Slice] = &[
    Slice::Service,
    Slice::Paths,
    Slice::Definitions,
    Slice::Resources,
];

/// Registry of memoized selector factories.
pub struct Selectors {
    config: ResourcesConfig,
    normalized: MemoCache<Fingerprint, NormalizedLinkSelector>,
    resolved: MemoCache<Fingerprint, ResolvedLinkSelector>,
    resource: MemoCache<Fingerprint, ResourceSelector>,
    resource_data: MemoCache<Fingerprint, ResourceDataSelector>,
    schema: MemoCache<Fingerprint, ResourceSchemaSelector>,
    denormalized: MemoCache<(Fingerprint, usize), ResourceSelector>,
    related: MemoCache<(Fingerprint, String), RelatedResourceSelector>,
}

impl Selectors {
    pub fn new(config: ResourcesConfig) -> Result<Self, ResourceError> {
        config.validate()?;
        let capacity = config.cache_capacity;
        Ok(Self {
            config,
            normalized: MemoCache::new(capacity),
            resolved: MemoCache::new(capacity),
            resource: MemoCache::new(capacity),
            resource_data: MemoCache::new(capacity),
            schema: MemoCache::new(capacity),
            denormalized: MemoCache::new(capacity),
            related: MemoCache::new(capacity),
        })
    }

    pub fn config(&self) -> &ResourcesConfig {
        &self.config
    }

    // ====================================================================
    // Link resolution
    // ====================================================================

    pub fn normalized_link(&self, link: &ResourceLink) -> NormalizedLinkSelector {
        let link = link.clone();
        self.normalized.get_or_insert_with(fingerprint(&link), || {
            Rc::new(Selector::new("normalized_link", NORMALIZED_DEPS, move |state| {
                normalize_link(&link, state.paths())
            }))
        })
    }

    pub fn resolved_link(&self, link: &ResourceLink) -> ResolvedLinkSelector {
        let link = link.clone();
        self.resolved.get_or_insert_with(fingerprint(&link), || {
            Rc::new(Selector::new("resolved_link", RESOLVED_DEPS, move |state| {
                state.service().resolve_resource_link(&link, state.api())
            }))
        })
    }

    // ====================================================================
    // Store lookups
    // ====================================================================

    /// Envelope stored under the link's fingerprint.
    pub fn resource(&self, link: &ResourceLink) -> ResourceSelector {
        let key = fingerprint(link);
        self.resource.get_or_insert_with(key, || {
            Rc::new(Selector::new("resource", RESOURCE_DEPS, move |state| {
                state.resources().get(&key).cloned()
            }))
        })
    }

    /// Flat response data stored in the entity dictionary for the link.
    pub fn resource_data(&self, link: &ResourceLink) -> ResourceDataSelector {
        let key = fingerprint(link);
        self.resource_data.get_or_insert_with(key, || {
            let entity_key = EntityKey::for_link(&key);
            Rc::new(Selector::new("resource_data", RESOURCE_DATA_DEPS, move |state| {
                state.entities().get(&entity_key).cloned()
            }))
        })
    }

    // ====================================================================
    // Schema
    // ====================================================================

    pub fn resource_schema(&self, link: &ResourceLink) -> ResourceSchemaSelector {
        let link = link.clone();
        self.schema.get_or_insert_with(fingerprint(&link), || {
            Rc::new(Selector::new("resource_schema", SCHEMA_DEPS, move |state| {
                find_resource_schema(Some(&link), state.api()).cloned()
            }))
        })
    }

    // ====================================================================
    // Denormalization
    // ====================================================================

    /// The stored envelope with `content` expanded `max_level` hops.
    ///
    /// Absent until the envelope itself is in the resource store. When the
    /// root entity is missing from the dictionary, the envelope's own
    /// `content` is kept flat, whatever `max_level` is.
    pub fn denormalized_resource(&self, link: &ResourceLink, max_level: usize) -> ResourceSelector {
        let key = fingerprint(link);
        let link = link.clone();
        let id_property = self.config.id_property.clone();
        self.denormalized.get_or_insert_with((key, max_level), || {
            Rc::new(Selector::new("denormalized_resource", DENORMALIZED_DEPS, move |state| {
                let resource = state.resources().get(&key)?;
                let schema = find_resource_schema(Some(&link), state.api());
                let content = Denormalizer::new(state.api(), state.entities())
                    .with_id_property(&id_property)
                    .denormalize(schema, max_level, &link)
                    .unwrap_or_else(|| resource.content.clone());
                Some(resource.with_content(content))
            }))
        })
    }

    pub fn denormalized_resource_default(&self, link: &ResourceLink) -> ResourceSelector {
        self.denormalized_resource(link, self.config.default_max_level)
    }

    // ====================================================================
    // Relations
    // ====================================================================

    pub fn related_resource(&self, link: &ResourceLink, rel: &str) -> RelatedResourceSelector {
        let link = link.clone();
        let rel = rel.to_string();
        self.related.get_or_insert_with((fingerprint(&link), rel.clone()), || {
            Rc::new(Selector::new("related_resource", RELATED_DEPS, move |state| {
                related::related_resource(&link, &rel, state)
            }))
        })
    }

    // ====================================================================
    // Diagnostics
    // ====================================================================

    /// Total selectors held across every factory cache.
    pub fn cache_len(&self) -> usize {
        self.normalized.len()
            + self.resolved.len()
            + self.resource.len()
            + self.resource_data.len()
            + self.schema.len()
            + self.denormalized.len()
            + self.related.len()
    }

    /// Drop every cached selector.
    pub fn clear(&self) {
        self.normalized.clear();
        self.resolved.clear();
        self.resource.clear();
        self.resource_data.clear();
        self.schema.clear();
        self.denormalized.clear();
        self.related.clear();
    }
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            config: ResourcesConfig::default(),
            normalized: MemoCache::unbounded(),
            resolved: MemoCache::unbounded(),
            resource: MemoCache::unbounded(),
            resource_data: MemoCache::unbounded(),
            schema: MemoCache::unbounded(),
            denormalized: MemoCache::unbounded(),
            related: MemoCache::unbounded(),
        }
    }
}

/// Slice accessors, mirroring the factories for whole-state reads.
pub fn paths_selector(state: &ResourcesState) -> &Paths {
    state.paths()
}

pub fn definitions_selector(state: &ResourcesState) -> &Definitions {
    state.definitions()
}

pub fn service_selector(state: &ResourcesState) -> &dyn ResourcesService {
    state.service()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::HyperSchemaService;
    use crate::store::{EntityDictionary, ResourceStore};
    use serde_json::json;

    fn state() -> ResourcesState {
        let api = serde_json::from_value(json!({
            "paths": {
                "getUser": { "path": "/users/{id}", "schema": { "$ref": "#/definitions/User" } },
                "list": { "params": { "size": 10 }, "schema": { "items": { "$ref": "#/definitions/Page" } } }
            },
            "definitions": {
                "User": {
                    "properties": { "friends": { "items": { "$ref": "#/definitions/User" } } }
                },
                "Page": { "links": { "next": "pageNext" } }
            }
        }))
        .unwrap();
        ResourcesState::builder().api(api).service(HyperSchemaService).build().unwrap()
    }

    fn user(id: i64) -> ResourceLink {
        ResourceLink::new("getUser").with_param("id", id)
    }

    #[test]
    fn equal_links_share_selector() {
        let selectors = Selectors::default();
        let a = selectors.resource_schema(&user(1));
        let b = selectors.resource_schema(&user(1));
        assert!(Rc::ptr_eq(&a, &b));
        assert!(!Rc::ptr_eq(&a, &selectors.resource_schema(&user(2))));
    }

    #[test]
    fn depth_and_rel_are_part_of_the_key() {
        let selectors = Selectors::default();
        assert!(Rc::ptr_eq(
            &selectors.denormalized_resource(&user(1), 1),
            &selectors.denormalized_resource_default(&user(1))
        ));
        assert!(!Rc::ptr_eq(
            &selectors.denormalized_resource(&user(1), 1),
            &selectors.denormalized_resource(&user(1), 2)
        ));
        assert!(!Rc::ptr_eq(
            &selectors.related_resource(&user(1), "next"),
            &selectors.related_resource(&user(1), "prev")
        ));
    }

    #[test]
    fn normalized_link_applies_static_params() {
        let selectors = Selectors::default();
        let canonical = selectors
            .normalized_link(&ResourceLink::new("list").with_param("page", 1))
            .select(&state());
        assert_eq!(canonical.params["size"], json!(10));
    }

    #[test]
    fn resolved_link_uses_service() {
        let selectors = Selectors::default();
        let resolved = selectors.resolved_link(&user(1)).select(&state());
        let resolved = (*resolved).as_ref().unwrap();
        assert_eq!(resolved.resource_schema, json!({ "$ref": "#/definitions/User" }));
    }

    #[test]
    fn schema_selector_ignores_entity_changes() {
        let selectors = Selectors::default();
        let selector = selectors.resource_schema(&user(1));
        let s = state();
        let a = selector.select(&s);
        let b = selector.select(&s.with_entities(EntityDictionary::new()));
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(selector.recomputations(), 1);
        assert!((*a).as_ref().unwrap().get("properties").is_some());
    }

    #[test]
    fn denormalized_absent_without_envelope() {
        let selectors = Selectors::default();
        let mut entities = EntityDictionary::new();
        entities.insert("User:1".into(), json!({ "id": 1, "friends": [] }));
        let s = state().with_entities(entities);
        assert_eq!(*selectors.denormalized_resource(&user(1), 1).select(&s), None);
    }

    #[test]
    fn denormalized_replaces_content_and_keeps_meta() {
        let selectors = Selectors::default();
        let mut entities = EntityDictionary::new();
        entities.insert("User:1".into(), json!({ "id": 1, "friends": [2] }));
        entities.insert("User:2".into(), json!({ "id": 2, "friends": [] }));
        let mut resources = ResourceStore::new();
        resources.insert(
            fingerprint(&user(1)),
            ResourceEnvelope::new(json!({ "id": 1 })).with_meta("status", "fetched"),
        );
        let s = state().with_entities(entities).with_resources(resources);

        let resource = selectors.denormalized_resource(&user(1), 1).select(&s);
        let resource = (*resource).as_ref().unwrap();
        assert_eq!(resource.meta["status"], "fetched");
        assert_eq!(resource.content, json!({ "id": 1, "friends": [{ "id": 2, "friends": [] }] }));
    }

    #[test]
    fn bounded_registry_evicts() {
        let selectors = Selectors::new(ResourcesConfig::bounded(2)).unwrap();
        let first = selectors.resource(&user(1));
        selectors.resource(&user(2));
        selectors.resource(&user(3));
        assert_eq!(selectors.cache_len(), 2);
        assert!(!Rc::ptr_eq(&first, &selectors.resource(&user(1))));
    }

    #[test]
    fn invalid_config_rejected() {
        assert!(Selectors::new(ResourcesConfig::bounded(0)).is_err());
    }

    #[test]
    fn clear_drops_everything() {
        let selectors = Selectors::default();
        selectors.resource(&user(1));
        selectors.resource_data(&user(1));
        selectors.related_resource(&user(1), "next");
        assert_eq!(selectors.cache_len(), 3);
        selectors.clear();
        assert_eq!(selectors.cache_len(), 0);
    }

    #[test]
    fn slice_accessors() {
        let s = state();
        assert!(paths_selector(&s).contains_key("getUser"));
        assert!(definitions_selector(&s).contains_key("User"));
        assert_eq!(
            service_selector(&s)
                .find_relation_link_name(&s.definitions()["Page"], "next")
                .as_deref(),
            Some("pageNext")
        );
    }
}
