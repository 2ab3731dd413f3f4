//! # Binding Registry
//!
//! Tag-name registry for bindings. An application builds one at startup,
//! defines each element it uses once, and creates bindings by tag afterwards.
//! Nothing here is global: two registries never see each other's definitions.
//!
//! ```
//! use jsonapi_binding::mock::MockTransport;
//! use jsonapi_binding::{
//!     BindingConfig, BindingDefinition, BindingRegistry, JsonApiFormatter, RawResponse,
//!     TransportAdapter,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = MockTransport::new();
//! transport
//!     .expect_get("https://api.example.com/authors/17")
//!     .return_ok(RawResponse::empty(204));
//!
//! let mut registry = BindingRegistry::new();
//! registry.define(
//!     "jsonapi-resource",
//!     BindingDefinition::new(TransportAdapter::new(transport, JsonApiFormatter)),
//! )?;
//!
//! let mut author = registry.create(
//!     "jsonapi-resource",
//!     BindingConfig::new("https://api.example.com", "/authors/17"),
//! )?;
//! let event = author.events().recv().await?;
//! assert_eq!(event.name(), "response-changed");
//! author.shutdown().await?;
//! # Ok(())
//! # }
//! ```

use crate::binding::ResourceBinding;
use crate::client::BindingClient;
use crate::config::BindingConfig;
use crate::error::BindingError;
use crate::event::BindingEvent;
use crate::hook::{NoopHook, RequestHook};
use crate::transport::TransportAdapter;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::info;

/// How bindings created under one tag are wired.
#[derive(Clone)]
pub struct BindingDefinition {
    adapter: TransportAdapter,
    hook: Arc<dyn RequestHook>,
}

impl BindingDefinition {
    pub fn new(adapter: TransportAdapter) -> Self {
        Self {
            adapter,
            hook: Arc::new(NoopHook),
        }
    }

    pub fn with_hook(mut self, hook: impl RequestHook) -> Self {
        self.hook = Arc::new(hook);
        self
    }
}

/// Explicit registry of binding definitions keyed by tag name.
#[derive(Default)]
pub struct BindingRegistry {
    definitions: HashMap<String, BindingDefinition>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines `tag`. A tag can only be defined once.
    pub fn define(&mut self, tag: &str, definition: BindingDefinition) -> Result<(), BindingError> {
        if self.definitions.contains_key(tag) {
            return Err(BindingError::AlreadyDefined(tag.to_string()));
        }
        info!(tag, "Element defined");
        self.definitions.insert(tag.to_string(), definition);
        Ok(())
    }

    pub fn is_defined(&self, tag: &str) -> bool {
        self.definitions.contains_key(tag)
    }

    /// Creates and spawns a binding for `tag`. Must be called from within a
    /// Tokio runtime.
    pub fn create(&self, tag: &str, config: BindingConfig) -> Result<BindingHandle, BindingError> {
        let definition = self
            .definitions
            .get(tag)
            .ok_or_else(|| BindingError::NotDefined(tag.to_string()))?;

        let (binding, client) = ResourceBinding::new(config, definition.adapter.clone());
        let events = client.subscribe();
        let task = tokio::spawn(binding.with_shared_hook(definition.hook.clone()).run());
        Ok(BindingHandle {
            client,
            events,
            task,
        })
    }
}

/// A running binding: its client, a notification receiver subscribed before the
/// binding started, and its task.
pub struct BindingHandle {
    client: BindingClient,
    events: broadcast::Receiver<BindingEvent>,
    task: JoinHandle<()>,
}

impl BindingHandle {
    pub fn client(&self) -> &BindingClient {
        &self.client
    }

    /// Notifications since the binding was created, including the initial fetch.
    pub fn events(&mut self) -> &mut broadcast::Receiver<BindingEvent> {
        &mut self.events
    }

    /// Drops this handle's client and waits for the binding to finish. Other
    /// clones of the client keep the binding alive.
    pub async fn shutdown(self) -> Result<(), BindingError> {
        drop(self.client);
        drop(self.events);
        self.task.await.map_err(|_| BindingError::BindingDropped)
    }
}
