//! Locating the schema node that describes a resource.

use serde_json::Value;

use crate::api::{ApiDescription, Definitions};
use crate::error::ResourceError;
use crate::link::ResourceLink;
use crate::pointer::SchemaPointer;

/// Schema key holding a definition's id property name.
pub const ID_PROPERTY_KEY: &str = "x-id-property";

/// Schema key holding relation metadata.
pub const RELATIONS_KEY: &str = "links";

/// The ref a resource schema points at: its own `$ref`, else `items.$ref`
/// for collection-shaped responses.
pub fn schema_ref(schema: &Value) -> Option<&str> {
    schema
        .get("$ref")
        .and_then(Value::as_str)
        .or_else(|| schema.get("items")?.get("$ref")?.as_str())
}

/// `true` when `schema` describes a collection of referenced resources.
pub fn is_collection(schema: &Value) -> bool {
    schema.get("$ref").is_none() && schema.get("items").and_then(|i| i.get("$ref")).is_some()
}

/// Resolve the definition `schema` refers to, with the pointer that led there.
pub fn resolve_ref<'a>(
    schema: &Value,
    definitions: &'a Definitions,
) -> Result<Option<(SchemaPointer, &'a Value)>, ResourceError> {
    let Some(reference) = schema_ref(schema) else {
        return Ok(None);
    };
    let pointer = SchemaPointer::parse(reference)?;
    let node = pointer.lookup(definitions)?;
    Ok(Some((pointer, node)))
}

/// Find the definitions node describing the resource `link` points at.
///
/// `Ok(None)` when the link is unknown or its template has no schema ref.
pub fn try_find_resource_schema<'a>(
    link: &ResourceLink,
    api: &'a ApiDescription,
) -> Result<Option<&'a Value>, ResourceError> {
    let Some(schema) = api.path(&link.name).and_then(|t| t.schema.as_ref()) else {
        return Ok(None);
    };
    Ok(resolve_ref(schema, &api.definitions)?.map(|(_, node)| node))
}

/// Like [`try_find_resource_schema`], with every failure folded into `None`.
pub fn find_resource_schema<'a>(
    link: Option<&ResourceLink>,
    api: &'a ApiDescription,
) -> Option<&'a Value> {
    let link = link?;
    match try_find_resource_schema(link, api) {
        Ok(node) => node,
        Err(e) => {
            tracing::debug!("resource schema for {:?} unresolved: {}", link.name, e);
            None
        }
    }
}

/// Follow a node that is nothing but a `$ref` to its target.
///
/// Nodes with other content are returned as is; so are refs that do not
/// resolve.
pub fn resolve_subschema<'a>(schema: &'a Value, definitions: &'a Definitions) -> &'a Value {
    let mut node = schema;
    // Bounded so `A -> B -> A` chains terminate.
    for _ in 0..16 {
        let Some(reference) = node.get("$ref").and_then(Value::as_str) else {
            return node;
        };
        let target = SchemaPointer::parse(reference)
            .ok()
            .and_then(|p| p.lookup(definitions).ok());
        match target {
            Some(next) => node = next,
            None => return node,
        }
    }
    node
}

pub fn id_property_name<'a>(schema: &'a Value, default: &'a str) -> &'a str {
    schema
        .get(ID_PROPERTY_KEY)
        .and_then(Value::as_str)
        .unwrap_or(default)
}

/// Name of the link template a schema declares for relation `rel`.
///
/// Relations live under `links`, either as a map or a list:
///
/// ```text
/// "links": { "next": "pageNext" }
/// "links": [{ "rel": "next", "linkName": "pageNext" }]
/// ```
pub fn find_relation_link_name(schema: &Value, rel: &str) -> Option<String> {
    match schema.get(RELATIONS_KEY)? {
        Value::Object(map) => map.get(rel)?.as_str().map(str::to_string),
        Value::Array(items) => items
            .iter()
            .find(|item| item.get("rel").and_then(Value::as_str) == Some(rel))?
            .get("linkName")?
            .as_str()
            .map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PointerError;
    use serde_json::json;

    fn api() -> ApiDescription {
        serde_json::from_value(json!({
            "paths": {
                "getFoo": { "schema": { "$ref": "#/definitions/Foo/Bar" } },
                "listFoo": { "schema": { "type": "array", "items": { "$ref": "#/definitions/Foo" } } },
                "broken": { "schema": { "$ref": "#/definitions/Missing" } },
                "noSchema": { "path": "/x" }
            },
            "definitions": {
                "Foo": {
                    "Bar": { "type": "object", "x-id-property": "uuid" },
                    "links": { "next": "pageNext" }
                },
                "Alias": { "$ref": "#/definitions/Foo/Bar" },
                "LoopA": { "$ref": "#/definitions/LoopB" },
                "LoopB": { "$ref": "#/definitions/LoopA" }
            }
        }))
        .unwrap()
    }

    #[test]
    fn schema_ref_direct_and_items() {
        assert_eq!(schema_ref(&json!({ "$ref": "#/definitions/A" })), Some("#/definitions/A"));
        assert_eq!(
            schema_ref(&json!({ "items": { "$ref": "#/definitions/B" } })),
            Some("#/definitions/B")
        );
        assert_eq!(schema_ref(&json!({ "type": "string" })), None);
        assert!(is_collection(&json!({ "items": { "$ref": "#/definitions/B" } })));
        assert!(!is_collection(&json!({ "$ref": "#/definitions/B" })));
    }

    #[test]
    fn finds_nested_definition() {
        let api = api();
        let link = ResourceLink::new("getFoo");
        assert_eq!(
            find_resource_schema(Some(&link), &api),
            Some(&api.definitions["Foo"]["Bar"])
        );
    }

    #[test]
    fn finds_collection_item_definition() {
        let api = api();
        let link = ResourceLink::new("listFoo");
        assert_eq!(find_resource_schema(Some(&link), &api), Some(&api.definitions["Foo"]));
    }

    #[test]
    fn absent_link_is_absent() {
        assert_eq!(find_resource_schema(None, &api()), None);
    }

    #[test]
    fn unresolvable_ref_is_absent_with_precise_error() {
        let api = api();
        let link = ResourceLink::new("broken");
        assert_eq!(find_resource_schema(Some(&link), &api), None);
        assert_eq!(
            try_find_resource_schema(&link, &api),
            Err(ResourceError::Pointer(PointerError::MissingSegment {
                pointer: "#/definitions/Missing".into(),
                segment: "Missing".into(),
                depth: 1,
            }))
        );
    }

    #[test]
    fn unknown_or_schemaless_links_are_absent() {
        let api = api();
        assert_eq!(try_find_resource_schema(&ResourceLink::new("nope"), &api), Ok(None));
        assert_eq!(try_find_resource_schema(&ResourceLink::new("noSchema"), &api), Ok(None));
    }

    #[test]
    fn subschema_follows_alias() {
        let api = api();
        assert_eq!(
            resolve_subschema(&api.definitions["Alias"], &api.definitions),
            &api.definitions["Foo"]["Bar"]
        );
        let plain = json!({ "type": "string" });
        assert_eq!(resolve_subschema(&plain, &api.definitions), &plain);
    }

    #[test]
    fn subschema_cycle_terminates() {
        let api = api();
        let node = resolve_subschema(&api.definitions["LoopA"], &api.definitions);
        assert!(node.get("$ref").is_some());
    }

    #[test]
    fn id_property_from_schema_or_default() {
        let api = api();
        assert_eq!(id_property_name(&api.definitions["Foo"]["Bar"], "id"), "uuid");
        assert_eq!(id_property_name(&api.definitions["Foo"], "id"), "id");
    }

    #[test]
    fn relation_map_form() {
        let api = api();
        assert_eq!(
            find_relation_link_name(&api.definitions["Foo"], "next").as_deref(),
            Some("pageNext")
        );
        assert_eq!(find_relation_link_name(&api.definitions["Foo"], "prev"), None);
    }

    #[test]
    fn relation_list_form() {
        let schema = json!({
            "links": [
                { "rel": "self", "linkName": "getPage" },
                { "rel": "next", "linkName": "pageNext" }
            ]
        });
        assert_eq!(find_relation_link_name(&schema, "next").as_deref(), Some("pageNext"));
        assert_eq!(find_relation_link_name(&schema, "up"), None);
        assert_eq!(find_relation_link_name(&json!({}), "next"), None);
    }
}
