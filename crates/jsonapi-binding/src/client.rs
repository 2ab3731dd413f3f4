//! # Binding Client
//!
//! The host-facing handle of a [`ResourceBinding`](crate::ResourceBinding).

use crate::document::WireDocument;
use crate::error::BindingError;
use crate::event::BindingEvent;
use crate::formatter::LocalModel;
use crate::message::{BindingRequest, Response};
use crate::state::{BindingState, Property};
use crate::transport::Verb;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, instrument};

/// A type-safe, cloneable handle for talking to a binding.
///
/// Property setters return once the binding has applied the change and run its
/// reactions. Network operations return the request id as soon as the request
/// is issued; their outcome is published as
/// [`BindingEvent::ResponseChanged`] and in the state snapshot.
#[derive(Clone)]
pub struct BindingClient {
    sender: mpsc::Sender<BindingRequest>,
    events: broadcast::Sender<BindingEvent>,
}

impl BindingClient {
    pub fn new(sender: mpsc::Sender<BindingRequest>, events: broadcast::Sender<BindingEvent>) -> Self {
        Self { sender, events }
    }

    /// Subscribes to `response-changed` notifications issued from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<BindingEvent> {
        self.events.subscribe()
    }

    async fn call<T>(
        &self,
        request: impl FnOnce(Response<T>) -> BindingRequest,
    ) -> Result<T, BindingError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(request(respond_to))
            .await
            .map_err(|_| BindingError::BindingClosed)?;
        response.await.map_err(|_| BindingError::BindingDropped)?
    }

    /// Sets `url`. Returns whether the value changed (and a fetch was issued).
    #[instrument(skip(self))]
    pub async fn set_base_url(&self, base_url: &str) -> Result<bool, BindingError> {
        self.set_address_parts(Some(base_url), None).await
    }

    /// Sets `resource`. Returns whether the value changed (and a fetch was issued).
    #[instrument(skip(self))]
    pub async fn set_resource_path(&self, resource_path: &str) -> Result<bool, BindingError> {
        self.set_address_parts(None, Some(resource_path)).await
    }

    /// Sets both parts in one change batch, issuing at most one fetch.
    #[instrument(skip(self))]
    pub async fn set_address(&self, base_url: &str, resource_path: &str) -> Result<bool, BindingError> {
        self.set_address_parts(Some(base_url), Some(resource_path)).await
    }

    /// Sets a string attribute by its host-facing name (`url` or `resource`).
    #[instrument(skip(self))]
    pub async fn set_attribute(&self, name: &str, value: &str) -> Result<bool, BindingError> {
        match Property::from_attribute(name) {
            Some(Property::BaseUrl) => self.set_address_parts(Some(value), None).await,
            Some(Property::ResourcePath) => self.set_address_parts(None, Some(value)).await,
            _ => Err(BindingError::UnknownAttribute(name.to_string())),
        }
    }

    async fn set_address_parts(
        &self,
        base_url: Option<&str>,
        resource_path: Option<&str>,
    ) -> Result<bool, BindingError> {
        debug!("Sending request");
        let base_url = base_url.map(str::to_string);
        let resource_path = resource_path.map(str::to_string);
        self.call(|respond_to| BindingRequest::SetAddress {
            base_url,
            resource_path,
            respond_to,
        })
        .await
    }

    /// Assigns the local model as an observed change: the binding re-serializes
    /// it into `data`. Serialization failures land in the `error` side channel.
    #[instrument(skip(self, model))]
    pub async fn set_model(&self, model: LocalModel) -> Result<(), BindingError> {
        debug!("Sending request");
        self.call(|respond_to| BindingRequest::SetModel { model, respond_to })
            .await
    }

    /// Assigns the local model and derives `data` in one step, without any
    /// network traffic. Returns the derived document.
    #[instrument(skip(self, model))]
    pub async fn update_model(&self, model: LocalModel) -> Result<WireDocument, BindingError> {
        debug!("Sending request");
        self.call(|respond_to| BindingRequest::UpdateModel { model, respond_to })
            .await
    }

    async fn send(&self, verb: Verb) -> Result<u64, BindingError> {
        debug!(%verb, "Sending request");
        self.call(|respond_to| BindingRequest::Send { verb, respond_to })
            .await
    }

    /// GET the current path.
    #[instrument(skip(self))]
    pub async fn fetch_resource(&self) -> Result<u64, BindingError> {
        self.send(Verb::Fetch).await
    }

    /// POST the current `data` to the current path.
    #[instrument(skip(self))]
    pub async fn create_resource(&self) -> Result<u64, BindingError> {
        self.send(Verb::Create).await
    }

    /// PATCH the current `data` to the current path.
    #[instrument(skip(self))]
    pub async fn replace_resource(&self) -> Result<u64, BindingError> {
        self.send(Verb::Replace).await
    }

    /// Alias of [`replace_resource`](Self::replace_resource).
    pub async fn put(&self) -> Result<u64, BindingError> {
        self.replace_resource().await
    }

    /// DELETE the current path.
    #[instrument(skip(self))]
    pub async fn delete_resource(&self) -> Result<u64, BindingError> {
        self.send(Verb::Delete).await
    }

    /// A snapshot of every observable property.
    pub async fn state(&self) -> Result<BindingState, BindingError> {
        self.call(|respond_to| BindingRequest::Snapshot { respond_to })
            .await
    }

    /// The derived path, `url + resource`.
    pub async fn path(&self) -> Result<String, BindingError> {
        Ok(self.state().await?.path())
    }
}
