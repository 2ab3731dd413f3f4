use serde::{Deserialize, Serialize};

/// JSON:API type of author resources.
pub const AUTHOR_TYPE: &str = "authors";

/// An author as seen by the application.
///
/// This is the deserialized local model of an `authors` resource: `type` and
/// `id` come from the resource object, the other fields from its attributes.
/// Relationships the server sends are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(default, rename = "birthYear", skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<u32>,
}

impl Author {
    /// Creates an author that has not been stored yet.
    ///
    /// # Notes
    /// The `id` is left empty and assigned by the server on create.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            kind: AUTHOR_TYPE.to_string(),
            id: None,
            name: name.into(),
            birth_year: None,
        }
    }

    pub fn with_birth_year(mut self, year: u32) -> Self {
        self.birth_year = Some(year);
        self
    }
}
