//! # Wire Types
//!
//! JSON:API documents as they travel over the wire, and the raw response
//! envelope the transport hands back to the binding.
//!
//! Every member is optional on the way in: servers differ in how strictly they
//! follow the format, and the binding only needs `data` and `included` to
//! deserialize. Members that were absent stay absent on the way out.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A JSON:API top-level document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireDocument {
    /// Primary data. `None` for both an absent member and `"data": null`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PrimaryData>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<ResourceObject>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonapi: Option<Value>,
}

impl WireDocument {
    /// A document wrapping a single resource.
    pub fn single(resource: ResourceObject) -> Self {
        Self {
            data: Some(PrimaryData::Single(resource)),
            ..Self::default()
        }
    }

    /// A document wrapping a collection of resources.
    pub fn collection(resources: Vec<ResourceObject>) -> Self {
        Self {
            data: Some(PrimaryData::Many(resources)),
            ..Self::default()
        }
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Finds a resource in `included` by type and id.
    pub fn find_included(&self, kind: &str, id: &Value) -> Option<&ResourceObject> {
        self.included
            .iter()
            .find(|r| r.kind.as_deref() == Some(kind) && r.id.as_ref() == Some(id))
    }
}

/// The `data` member of a document: one resource or many.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryData {
    Many(Vec<ResourceObject>),
    Single(ResourceObject),
}

/// A resource object: `type`, `id`, `attributes`, `relationships`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceObject {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Ids are strings per the format, but numeric ids are common enough in
    /// the wild that they are kept verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, Relationship>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

impl ResourceObject {
    pub fn new(kind: impl Into<String>, id: impl Into<Value>) -> Self {
        Self {
            kind: Some(kind.into()),
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_relationship(mut self, name: impl Into<String>, linkage: Linkage) -> Self {
        self.relationships.insert(
            name.into(),
            Relationship {
                data: Some(linkage),
                ..Relationship::default()
            },
        );
        self
    }
}

/// A relationship member of a resource object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Linkage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

/// Resource linkage: to-one or to-many.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Linkage {
    Many(Vec<ResourceIdentifier>),
    One(ResourceIdentifier),
}

/// `{ "type": ..., "id": ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: Value,
}

impl ResourceIdentifier {
    pub fn new(kind: impl Into<String>, id: impl Into<Value>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

/// The transport result of a network call.
///
/// Replaced wholesale on every completed call, never merged with the previous
/// value. `data` is `None` when the reply carried no JSON:API payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub data: Option<WireDocument>,
}

impl RawResponse {
    pub fn new(status: u16, data: WireDocument) -> Self {
        Self {
            status,
            headers: Vec::new(),
            data: Some(data),
        }
    }

    /// A reply without a payload (e.g. `204 No Content`).
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            data: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn has_payload(&self) -> bool {
        self.data.is_some()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
