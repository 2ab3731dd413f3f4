//! Construction-time settings for a binding.

use crate::state::Address;

/// Wrapper key a local model is nested under before serialization.
pub const DEFAULT_WRAPPER_KEY: &str = "stuff";

/// Settings for a [`ResourceBinding`](crate::ResourceBinding).
///
/// The initial address counts as the first change batch: a binding created
/// with a non-empty path fetches it once on start.
#[derive(Debug, Clone)]
pub struct BindingConfig {
    pub base_url: String,
    pub resource_path: String,
    pub wrapper_key: String,
    /// Capacity of the request channel. Callers wait when it is full.
    pub buffer_size: usize,
    /// Capacity of the notification channel. Slow subscribers lag past it.
    pub event_capacity: usize,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            resource_path: String::new(),
            wrapper_key: DEFAULT_WRAPPER_KEY.to_string(),
            buffer_size: 32,
            event_capacity: 16,
        }
    }
}

impl BindingConfig {
    pub fn new(base_url: impl Into<String>, resource_path: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            resource_path: resource_path.into(),
            ..Self::default()
        }
    }

    pub fn with_wrapper_key(mut self, wrapper_key: impl Into<String>) -> Self {
        self.wrapper_key = wrapper_key.into();
        self
    }

    pub fn address(&self) -> Address {
        Address::new(self.base_url.clone(), self.resource_path.clone())
    }
}
