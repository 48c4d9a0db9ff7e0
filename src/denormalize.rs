//! Depth-bounded reassembly of nested resources from flat entities.
//!
//! Expansion is driven by the resource schema. Every `$ref` (single
//! relation) or `items.$ref` (collection) met while walking a value is
//! looked up in the entity dictionary as `{Definition}:{id}` and replaced
//! by that entity, itself expanded with one hop less. At zero remaining
//! hops values are returned untouched. A reference whose entity is missing
//! keeps its original value.

use serde_json::{Map, Value};

use crate::api::{ApiDescription, normalize_link};
use crate::fingerprint::fingerprint;
use crate::link::ResourceLink;
use crate::pointer::SchemaPointer;
use crate::schema::{id_property_name, is_collection, resolve_subschema, schema_ref};
use crate::store::{EntityDictionary, EntityKey, id_key_part};

pub use crate::config::DEFAULT_ID_PROPERTY;

pub struct Denormalizer<'a> {
    api: &'a ApiDescription,
    entities: &'a EntityDictionary,
    id_property: &'a str,
}

impl<'a> Denormalizer<'a> {
    pub fn new(api: &'a ApiDescription, entities: &'a EntityDictionary) -> Self {
        Self {
            api,
            entities,
            id_property: DEFAULT_ID_PROPERTY,
        }
    }

    pub fn with_id_property(mut self, id_property: &'a str) -> Self {
        self.id_property = id_property;
        self
    }

    /// Content for `link`, expanded `max_level` hops deep.
    ///
    /// `schema` is the definitions node describing the resource. Returns
    /// `None` only when the root content itself is not in the dictionary.
    pub fn denormalize(
        &self,
        schema: Option<&Value>,
        max_level: usize,
        link: &ResourceLink,
    ) -> Option<Value> {
        let template_schema = self.api.path(&link.name).and_then(|t| t.schema.as_ref());
        let root = self.root_content(schema, template_schema, link)?;
        if max_level == 0 {
            return Some(root.clone());
        }

        let expanded = match (template_schema, schema) {
            (Some(collection), _) if is_collection(collection) => self.walk(collection, root, max_level),
            (_, Some(schema)) => self.walk(schema, root, max_level),
            _ => root.clone(),
        };
        Some(expanded)
    }

    /// The response stored under the link's fingerprint, else the entity
    /// named by the resource's definition and the link's id param.
    fn root_content(
        &self,
        schema: Option<&Value>,
        template_schema: Option<&Value>,
        link: &ResourceLink,
    ) -> Option<&'a Value> {
        let canonical = normalize_link(link, &self.api.paths);
        let mut candidates = vec![EntityKey::for_link(&fingerprint(link))];
        if canonical.as_link() != link {
            candidates.push(EntityKey::for_link(&fingerprint(canonical.as_link())));
        }

        let definition = template_schema
            .filter(|s| !is_collection(s))
            .and_then(schema_ref)
            .and_then(|r| SchemaPointer::parse(r).ok());
        if let Some(name) = definition.as_ref().and_then(SchemaPointer::name) {
            let id_property = schema
                .map(|s| id_property_name(s, self.id_property))
                .unwrap_or(self.id_property);
            if let Some(id) = canonical.params.get(id_property).and_then(id_key_part) {
                candidates.push(EntityKey::for_entity(name, &id));
            }
        }

        let found = candidates.iter().find_map(|key| self.entities.get(key));
        if found.is_none() {
            tracing::debug!("no root entity for link {:?}", link.name);
        }
        found
    }

    /// Walk `value` under `schema` with `depth > 0` hops left.
    fn walk(&self, schema: &Value, value: &Value, depth: usize) -> Value {
        if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
            return self.expand_ref(reference, value, depth);
        }
        match value {
            Value::Array(items) => match schema.get("items") {
                Some(item_schema) => Value::Array(
                    items
                        .iter()
                        .map(|item| self.walk(item_schema, item, depth))
                        .collect(),
                ),
                None => value.clone(),
            },
            Value::Object(fields) => {
                let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
                    return value.clone();
                };
                Value::Object(self.walk_fields(properties, fields, depth))
            }
            _ => value.clone(),
        }
    }

    fn walk_fields(
        &self,
        properties: &Map<String, Value>,
        fields: &Map<String, Value>,
        depth: usize,
    ) -> Map<String, Value> {
        fields
            .iter()
            .map(|(key, field)| {
                let field = match properties.get(key) {
                    Some(property) => self.walk(property, field, depth),
                    None => field.clone(),
                };
                (key.clone(), field)
            })
            .collect()
    }

    fn expand_ref(&self, reference: &str, value: &Value, depth: usize) -> Value {
        let definitions = &self.api.definitions;
        let resolved = SchemaPointer::parse(reference).and_then(|p| {
            let node = p.lookup(definitions)?;
            Ok((p, node))
        });
        let (pointer, target) = match resolved {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("leaving reference unexpanded: {}", e);
                return value.clone();
            }
        };
        let target = resolve_subschema(target, definitions);
        if target.get("$ref").is_some() {
            tracing::warn!("leaving reference unexpanded: {} is a $ref cycle", pointer);
            return value.clone();
        }

        match value {
            // Embedded rather than referenced: walk in place, no hop spent.
            Value::Object(_) => self.walk(target, value, depth),
            _ => {
                let Some(name) = pointer.name() else {
                    return value.clone();
                };
                let Some(id) = id_key_part(value) else {
                    return value.clone();
                };
                let key = EntityKey::for_entity(name, &id);
                match self.entities.get(&key) {
                    Some(entity) if depth > 1 => self.walk(target, entity, depth - 1),
                    Some(entity) => entity.clone(),
                    None => {
                        tracing::debug!("entity {} missing, reference kept", key);
                        value.clone()
                    }
                }
            }
        }
    }
}

/// [`Denormalizer::denormalize`] with the default id property.
pub fn denormalize(
    schema: Option<&Value>,
    api: &ApiDescription,
    entities: &EntityDictionary,
    max_level: usize,
    link: &ResourceLink,
) -> Option<Value> {
    Denormalizer::new(api, entities).denormalize(schema, max_level, link)
}
