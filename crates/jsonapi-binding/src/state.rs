//! # Observable State
//!
//! The properties a binding publishes to its host, and the address they are
//! fetched from.

use crate::document::{RawResponse, WireDocument};
use crate::error::BindingError;
use crate::formatter::LocalModel;
use std::fmt;
use std::sync::Arc;

/// The observable properties of a binding, named as the host sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// `url`: base URL of the API, no trailing slash.
    BaseUrl,
    /// `resource`: path of the resource, e.g. `/authors/17.json`.
    ResourcePath,
    /// `response`: the raw result of the last completed call.
    Response,
    /// `data`: the JSON:API document.
    Data,
    /// `deserialized`: the local model.
    Deserialized,
}

impl Property {
    pub const ALL: [Property; 5] = [
        Property::BaseUrl,
        Property::ResourcePath,
        Property::Response,
        Property::Data,
        Property::Deserialized,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Property::BaseUrl => "url",
            Property::ResourcePath => "resource",
            Property::Response => "response",
            Property::Data => "data",
            Property::Deserialized => "deserialized",
        }
    }

    /// Properties a host may set through string attributes.
    pub fn from_attribute(name: &str) -> Option<Property> {
        match name {
            "url" => Some(Property::BaseUrl),
            "resource" => Some(Property::ResourcePath),
            _ => None,
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a resource lives: base URL plus resource path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub base_url: String,
    pub resource_path: String,
}

impl Address {
    pub fn new(base_url: impl Into<String>, resource_path: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            resource_path: resource_path.into(),
        }
    }

    /// `base_url + resource_path`, recomputed on every call.
    pub fn path(&self) -> String {
        format!("{}{}", self.base_url, self.resource_path)
    }

    pub fn is_empty(&self) -> bool {
        self.base_url.is_empty() && self.resource_path.is_empty()
    }
}

/// A snapshot of everything a binding publishes.
#[derive(Debug, Clone, Default)]
pub struct BindingState {
    pub address: Address,
    /// `None` until the first call completes successfully.
    pub response: Option<RawResponse>,
    pub data: Option<WireDocument>,
    pub deserialized: Option<LocalModel>,
    /// Side channel for the last failure. Cleared by a successful round-trip.
    pub error: Option<Arc<BindingError>>,
}

impl BindingState {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }

    pub fn path(&self) -> String {
        self.address.path()
    }
}
