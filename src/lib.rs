//! Resources — link resolution and denormalization for hypermedia clients.
//!
//! A pure read/derive layer over state the host owns: an API description
//! (path templates + schema definitions), a flat entity dictionary, and a
//! resource store keyed by link fingerprint. Nothing here fetches, writes,
//! or validates.
//!
//! # Pieces
//!
//! - [`fingerprint()`] — content hash of a `{name, params}` link, the cache key
//!   for everything else
//! - [`normalize_link`] — apply a path template's static params
//! - [`find_resource_schema`] — the definitions node a link's response is
//! - [`denormalize()`] — rebuild nested objects from flat entities, `max_level`
//!   hops deep
//! - [`related_resource`] — follow a schema-declared relation to a stored
//!   resource
//! - [`Selectors`] — memoized factories of version-gated accessors over a
//!   [`ResourcesState`] snapshot
//!
//! # Example
//!
//! ```ignore
//! use openerp_resources::*;
//!
//! let state = ResourcesState::builder()
//!     .api(ApiDescription::from_json(DESCRIPTION)?)
//!     .entities(entities)
//!     .resources(resources)
//!     .service(HyperSchemaService)
//!     .build()?;
//!
//! let selectors = Selectors::new(ResourcesConfig::bounded(1024))?;
//! let link = ResourceLink::new("getUser").with_param("id", 1);
//!
//! // Same link, same selector; same slice versions, same result.
//! let user = selectors.denormalized_resource(&link, 1).select(&state);
//! ```
//!
//! Single-threaded: selectors and caches use `Rc`/`RefCell` and are neither
//! `Send` nor `Sync`.

pub mod api;
pub mod cache;
pub mod config;
pub mod denormalize;
pub mod error;
pub mod fingerprint;
pub mod link;
pub mod pointer;
pub mod related;
pub mod schema;
pub mod selector;
pub mod selectors;
pub mod service;
pub mod state;
pub mod store;

pub use api::{ApiDescription, Definitions, PathTemplate, Paths, normalize_link};
pub use cache::MemoCache;
pub use config::ResourcesConfig;
pub use denormalize::{Denormalizer, denormalize};
pub use error::{PointerError, ResourceError};
pub use fingerprint::{Fingerprint, fingerprint};
pub use link::{CanonicalLink, LinkParams, ResolvedLink, ResourceLink};
pub use pointer::SchemaPointer;
pub use related::{related_link, related_resource};
pub use schema::{find_relation_link_name, find_resource_schema, try_find_resource_schema};
pub use selector::Selector;
pub use selectors::Selectors;
pub use service::{HyperSchemaService, ResourcesService};
pub use state::{ResourcesState, ResourcesStateBuilder, Slice};
pub use store::{EntityDictionary, EntityKey, ResourceEnvelope, ResourceStore};
