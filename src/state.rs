//! Versioned, read-only snapshots of everything the selectors derive from.
//!
//! The host owns the data. Each change produces a new snapshot through a
//! `with_*` method, which bumps only the version of the slice it replaced.
//! Selectors compare slice versions to decide whether to recompute.

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::api::{ApiDescription, Definitions, Paths};
use crate::error::ResourceError;
use crate::service::ResourcesService;
use crate::store::{EntityDictionary, ResourceStore};

/// Process-wide so versions from unrelated snapshots never coincide.
static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

fn next_version() -> u64 {
    NEXT_VERSION.fetch_add(1, Ordering::Relaxed)
}

/// A dependency a selector can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slice {
    Paths,
    Definitions,
    Entities,
    Resources,
    Service,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Versions {
    paths: u64,
    definitions: u64,
    entities: u64,
    resources: u64,
    service: u64,
}

impl Versions {
    fn fresh() -> Self {
        Self {
            paths: next_version(),
            definitions: next_version(),
            entities: next_version(),
            resources: next_version(),
            service: next_version(),
        }
    }
}

#[derive(Clone)]
pub struct ResourcesState {
    api: Rc<ApiDescription>,
    entities: Rc<EntityDictionary>,
    resources: Rc<ResourceStore>,
    service: Rc<dyn ResourcesService>,
    versions: Versions,
}

impl ResourcesState {
    pub fn builder() -> ResourcesStateBuilder {
        ResourcesStateBuilder::default()
    }

    pub fn api(&self) -> &ApiDescription {
        &self.api
    }

    pub fn paths(&self) -> &Paths {
        &self.api.paths
    }

    pub fn definitions(&self) -> &Definitions {
        &self.api.definitions
    }

    pub fn entities(&self) -> &EntityDictionary {
        &self.entities
    }

    pub fn resources(&self) -> &ResourceStore {
        &self.resources
    }

    pub fn service(&self) -> &dyn ResourcesService {
        self.service.as_ref()
    }

    pub fn version(&self, slice: Slice) -> u64 {
        match slice {
            Slice::Paths => self.versions.paths,
            Slice::Definitions => self.versions.definitions,
            Slice::Entities => self.versions.entities,
            Slice::Resources => self.versions.resources,
            Slice::Service => self.versions.service,
        }
    }

    // ====================================================================
    // Derived snapshots
    // ====================================================================

    pub fn with_paths(&self, paths: Paths) -> Self {
        let mut next = self.clone();
        Rc::make_mut(&mut next.api).paths = paths;
        next.versions.paths = next_version();
        next
    }

    pub fn with_definitions(&self, definitions: Definitions) -> Self {
        let mut next = self.clone();
        Rc::make_mut(&mut next.api).definitions = definitions;
        next.versions.definitions = next_version();
        next
    }

    /// Replace the whole description; both paths and definitions change.
    pub fn with_api(&self, api: ApiDescription) -> Self {
        let mut next = self.clone();
        next.api = Rc::new(api);
        next.versions.paths = next_version();
        next.versions.definitions = next_version();
        next
    }

    pub fn with_entities(&self, entities: EntityDictionary) -> Self {
        let mut next = self.clone();
        next.entities = Rc::new(entities);
        next.versions.entities = next_version();
        next
    }

    pub fn with_resources(&self, resources: ResourceStore) -> Self {
        let mut next = self.clone();
        next.resources = Rc::new(resources);
        next.versions.resources = next_version();
        next
    }

    pub fn with_service(&self, service: Rc<dyn ResourcesService>) -> Self {
        let mut next = self.clone();
        next.service = service;
        next.versions.service = next_version();
        next
    }
}

#[derive(Default)]
pub struct ResourcesStateBuilder {
    api: ApiDescription,
    entities: EntityDictionary,
    resources: ResourceStore,
    service: Option<Rc<dyn ResourcesService>>,
}

impl ResourcesStateBuilder {
    pub fn api(mut self, api: ApiDescription) -> Self {
        self.api = api;
        self
    }

    pub fn entities(mut self, entities: EntityDictionary) -> Self {
        self.entities = entities;
        self
    }

    pub fn resources(mut self, resources: ResourceStore) -> Self {
        self.resources = resources;
        self
    }

    pub fn service(mut self, service: impl ResourcesService + 'static) -> Self {
        self.service = Some(Rc::new(service));
        self
    }

    pub fn shared_service(mut self, service: Rc<dyn ResourcesService>) -> Self {
        self.service = Some(service);
        self
    }

    /// Fails with `MissingCapability` when no resolution strategy was given.
    pub fn build(self) -> Result<ResourcesState, ResourceError> {
        let service = self
            .service
            .ok_or(ResourceError::MissingCapability("ResourcesService::resolve_resource_link"))?;
        Ok(ResourcesState {
            api: Rc::new(self.api),
            entities: Rc::new(self.entities),
            resources: Rc::new(self.resources),
            service,
            versions: Versions::fresh(),
        })
    }
}
