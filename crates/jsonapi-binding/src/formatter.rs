//! # JSON:API Formatter
//!
//! Converts between the wire shape ([`WireDocument`]) and the flat, UI-facing
//! shape ([`LocalModel`]) the host edits.
//!
//! ## Model shape
//!
//! A resource object
//!
//! ```text
//! { "type": "authors", "id": "17",
//!   "attributes": { "name": "Ada" },
//!   "relationships": { "books": { "data": [{ "type": "books", "id": "1" }] } } }
//! ```
//!
//! flattens to
//!
//! ```text
//! { "type": "authors", "id": "17", "name": "Ada",
//!   "books": [{ "type": "books", "id": "1", "title": "..." }] }
//! ```
//!
//! where related resources are resolved against `included` when present.
//! Serialization walks the other way: any field holding an object (or a
//! non-empty array of objects) with both `type` and `id` becomes a
//! relationship, and related objects that carry more than their identifier are
//! emitted into `included`.
//!
//! ## Limits
//!
//! `deserialize(serialize(m)) == m` holds for models whose related objects are
//! other resources. A model that nests a copy of its own resource (same `type`
//! and `id`) comes back with that copy reduced to `{type, id}`: the primary
//! resource is never repeated in `included`, and resolving it would recurse.

use crate::document::{
    Linkage, PrimaryData, ResourceIdentifier, ResourceObject, WireDocument,
};
use crate::error::FormatError;
use serde_json::{Map, Value};

/// The deserialized, UI-facing representation of a resource.
pub type LocalModel = Value;

/// The (de)serializer collaborator used by the binding.
pub trait Formatter: Send + Sync + 'static {
    /// Serializes the model held under `wrapper_key` into a wire document.
    fn serialize(&self, model: &LocalModel, wrapper_key: &str) -> Result<WireDocument, FormatError>;

    /// Deserializes a wire document into a local model.
    fn deserialize(&self, document: &WireDocument) -> Result<LocalModel, FormatError>;
}

/// JSON:API formatter that flattens resources into plain JSON models.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonApiFormatter;

impl JsonApiFormatter {
    fn to_resource(&self, fields: &Map<String, Value>, included: &mut Vec<ResourceObject>) -> ResourceObject {
        let mut resource = ResourceObject::default();
        for (name, value) in fields {
            match (name.as_str(), value) {
                ("type", Value::String(kind)) => resource.kind = Some(kind.clone()),
                ("id", id) if !id.is_null() => resource.id = Some(id.clone()),
                _ => match linkage_of(value) {
                    Some(linkage) => {
                        self.include(value, included);
                        resource = resource.with_relationship(name.clone(), linkage);
                    }
                    None => {
                        resource.attributes.insert(name.clone(), value.clone());
                    }
                },
            }
        }
        resource
    }

    fn include(&self, value: &Value, included: &mut Vec<ResourceObject>) {
        let related: Vec<&Map<String, Value>> = match value {
            Value::Object(fields) => vec![fields],
            Value::Array(items) => items.iter().filter_map(Value::as_object).collect(),
            _ => Vec::new(),
        };
        for fields in related {
            let resource = self.to_resource(fields, included);
            if resource.attributes.is_empty() && resource.relationships.is_empty() {
                continue;
            }
            let seen = included
                .iter()
                .any(|r| r.kind == resource.kind && r.id == resource.id);
            if !seen {
                included.push(resource);
            }
        }
    }

    fn to_model(
        &self,
        resource: &ResourceObject,
        document: &WireDocument,
        stack: &mut Vec<(String, Value)>,
    ) -> LocalModel {
        let mut model = resource.attributes.clone();
        if let Some(kind) = &resource.kind {
            model.insert("type".to_string(), Value::String(kind.clone()));
        }
        if let Some(id) = &resource.id {
            model.insert("id".to_string(), id.clone());
        }

        let key = resource.kind.clone().zip(resource.id.clone());
        if let Some(key) = &key {
            stack.push(key.clone());
        }
        for (name, relationship) in &resource.relationships {
            let value = match &relationship.data {
                None => Value::Null,
                Some(Linkage::One(identifier)) => self.resolve(identifier, document, stack),
                Some(Linkage::Many(identifiers)) => Value::Array(
                    identifiers
                        .iter()
                        .map(|identifier| self.resolve(identifier, document, stack))
                        .collect(),
                ),
            };
            model.insert(name.clone(), value);
        }
        if key.is_some() {
            stack.pop();
        }

        Value::Object(model)
    }

    fn resolve(
        &self,
        identifier: &ResourceIdentifier,
        document: &WireDocument,
        stack: &mut Vec<(String, Value)>,
    ) -> LocalModel {
        let cyclic = stack
            .iter()
            .any(|(kind, id)| *kind == identifier.kind && *id == identifier.id);
        match document.find_included(&identifier.kind, &identifier.id) {
            Some(resource) if !cyclic => self.to_model(resource, document, stack),
            _ => identifier_model(identifier),
        }
    }
}

impl Formatter for JsonApiFormatter {
    fn serialize(&self, model: &LocalModel, wrapper_key: &str) -> Result<WireDocument, FormatError> {
        let mut included = Vec::new();
        let mut document = match model {
            Value::Null => {
                return Err(FormatError::MissingModel {
                    wrapper_key: wrapper_key.to_string(),
                })
            }
            Value::Object(fields) => WireDocument::single(self.to_resource(fields, &mut included)),
            Value::Array(items) => {
                let resources = items
                    .iter()
                    .map(|item| match item {
                        Value::Object(fields) => Ok(self.to_resource(fields, &mut included)),
                        other => Err(FormatError::NotAResource(other.to_string())),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                WireDocument::collection(resources)
            }
            other => return Err(FormatError::NotAResource(other.to_string())),
        };
        // A compound document never repeats primary data in `included`.
        included.retain(|resource| !is_primary(&document, resource));
        document.included = included;
        Ok(document)
    }

    fn deserialize(&self, document: &WireDocument) -> Result<LocalModel, FormatError> {
        let mut stack = Vec::new();
        Ok(match &document.data {
            None => Value::Null,
            Some(PrimaryData::Single(resource)) => self.to_model(resource, document, &mut stack),
            Some(PrimaryData::Many(resources)) => Value::Array(
                resources
                    .iter()
                    .map(|resource| self.to_model(resource, document, &mut stack))
                    .collect(),
            ),
        })
    }
}

fn is_primary(document: &WireDocument, resource: &ResourceObject) -> bool {
    let same = |primary: &ResourceObject| {
        primary.id.is_some() && primary.kind == resource.kind && primary.id == resource.id
    };
    match &document.data {
        Some(PrimaryData::Single(primary)) => same(primary),
        Some(PrimaryData::Many(primaries)) => primaries.iter().any(same),
        None => false,
    }
}

fn identifier_of(fields: &Map<String, Value>) -> Option<ResourceIdentifier> {
    let kind = fields.get("type")?.as_str()?;
    let id = fields.get("id").filter(|id| !id.is_null())?;
    Some(ResourceIdentifier::new(kind, id.clone()))
}

fn linkage_of(value: &Value) -> Option<Linkage> {
    match value {
        Value::Object(fields) => identifier_of(fields).map(Linkage::One),
        Value::Array(items) if !items.is_empty() => items
            .iter()
            .map(|item| item.as_object().and_then(identifier_of))
            .collect::<Option<Vec<_>>>()
            .map(Linkage::Many),
        _ => None,
    }
}

fn identifier_model(identifier: &ResourceIdentifier) -> LocalModel {
    let mut model = Map::new();
    model.insert("type".to_string(), Value::String(identifier.kind.clone()));
    model.insert("id".to_string(), identifier.id.clone());
    Value::Object(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const STUFF: &str = "stuff";

    #[test]
    fn test_deserialize_flattens_attributes_and_resolves_included() {
        let document = WireDocument::from_value(json!({
            "data": {
                "type": "authors", "id": "17",
                "attributes": { "name": "Ada" },
                "relationships": {
                    "books": { "data": [{ "type": "books", "id": "1" }, { "type": "books", "id": "2" }] }
                }
            },
            "included": [
                { "type": "books", "id": "1", "attributes": { "title": "Notes" } }
            ]
        }))
        .unwrap();

        let model = JsonApiFormatter.deserialize(&document).unwrap();
        assert_eq!(
            model,
            json!({
                "type": "authors", "id": "17", "name": "Ada",
                "books": [
                    { "type": "books", "id": "1", "title": "Notes" },
                    { "type": "books", "id": "2" }
                ]
            })
        );
    }

    #[test]
    fn test_deserialize_empty_document_is_null() {
        let model = JsonApiFormatter.deserialize(&WireDocument::default()).unwrap();
        assert_eq!(model, Value::Null);
    }

    #[test]
    fn test_deserialize_survives_cyclic_includes() {
        let document = WireDocument::from_value(json!({
            "data": {
                "type": "people", "id": "1",
                "relationships": { "friend": { "data": { "type": "people", "id": "2" } } }
            },
            "included": [{
                "type": "people", "id": "2",
                "attributes": { "name": "Grace" },
                "relationships": { "friend": { "data": { "type": "people", "id": "1" } } }
            }]
        }))
        .unwrap();

        let model = JsonApiFormatter.deserialize(&document).unwrap();
        assert_eq!(model["friend"]["name"], json!("Grace"));
        assert_eq!(model["friend"]["friend"], json!({ "type": "people", "id": "1" }));
    }

    #[test]
    fn test_serialize_splits_attributes_and_relationships() {
        let model = json!({
            "type": "authors", "id": "17", "name": "Ada",
            "tags": [],
            "publisher": { "type": "publishers", "id": "9", "name": "Babbage & Co" },
            "books": [{ "type": "books", "id": "1" }]
        });

        let document = JsonApiFormatter.serialize(&model, STUFF).unwrap();
        let Some(PrimaryData::Single(author)) = &document.data else {
            panic!("expected a single resource");
        };
        assert_eq!(author.kind.as_deref(), Some("authors"));
        assert_eq!(author.id, Some(json!("17")));
        assert_eq!(author.attributes.get("name"), Some(&json!("Ada")));
        assert_eq!(author.attributes.get("tags"), Some(&json!([])));
        assert_eq!(
            author.relationships["publisher"].data,
            Some(Linkage::One(ResourceIdentifier::new("publishers", "9")))
        );
        // Bare identifiers are linked but not included.
        assert_eq!(document.included.len(), 1);
        assert_eq!(document.included[0].attributes["name"], json!("Babbage & Co"));
    }

    #[test]
    fn test_serialize_rejects_missing_and_scalar_models() {
        assert!(matches!(
            JsonApiFormatter.serialize(&Value::Null, STUFF),
            Err(FormatError::MissingModel { ref wrapper_key }) if wrapper_key == STUFF
        ));
        assert!(matches!(
            JsonApiFormatter.serialize(&json!("Ada"), STUFF),
            Err(FormatError::NotAResource(_))
        ));
        assert!(matches!(
            JsonApiFormatter.serialize(&json!([{ "name": "Ada" }, 3]), STUFF),
            Err(FormatError::NotAResource(_))
        ));
    }

    #[test]
    fn test_round_trip_preserves_models() {
        let models = [
            json!({ "name": "Ada" }),
            json!({ "type": "authors", "id": 17, "name": "Ada", "born": 1815, "alive": false }),
            json!({
                "type": "authors", "id": "17",
                "publisher": {
                    "type": "publishers", "id": "9", "name": "Babbage & Co",
                    "owner": { "type": "people", "id": "3" }
                },
                "books": [{ "type": "books", "id": "1", "title": "Notes" }]
            }),
            json!([{ "type": "authors", "id": "1" }, { "type": "authors", "id": "2", "name": "Grace" }]),
        ];

        for model in models {
            let document = JsonApiFormatter.serialize(&model, STUFF).unwrap();
            let back = JsonApiFormatter.deserialize(&document).unwrap();
            assert_eq!(back, model, "round trip through {:?}", document);
        }
    }

    #[test]
    fn test_self_reference_is_not_included() {
        let model = json!({
            "type": "people", "id": "1", "name": "A",
            "best": { "type": "people", "id": "1", "name": "A" },
            "friend": { "type": "people", "id": "2", "name": "B" }
        });

        let document = JsonApiFormatter.serialize(&model, STUFF).unwrap();
        assert_eq!(document.included.len(), 1);
        assert_eq!(document.included[0].id, Some(json!("2")));

        let back = JsonApiFormatter.deserialize(&document).unwrap();
        assert_eq!(back["friend"], json!({ "type": "people", "id": "2", "name": "B" }));
        assert_eq!(back["best"], json!({ "type": "people", "id": "1" }));
    }
}
