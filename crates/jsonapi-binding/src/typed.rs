//! # TypedBinding Trait
//!
//! Lets domain clients wrap a [`BindingClient`] and read and write the local
//! model as a serde type instead of raw JSON.
use crate::document::WireDocument;
use crate::error::{BindingError, FormatError};
use crate::BindingClient;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Trait for resource-specific clients built on a generic binding.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use jsonapi_binding::mock::MockTransport;
/// use jsonapi_binding::{
///     BindingClient, BindingConfig, JsonApiFormatter, ResourceBinding, TransportAdapter,
///     TypedBinding,
/// };
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Author {
///     #[serde(rename = "type")]
///     kind: String,
///     name: String,
/// }
///
/// struct AuthorClient {
///     inner: BindingClient,
/// }
///
/// #[async_trait]
/// impl TypedBinding for AuthorClient {
///     type Model = Author;
///     fn inner(&self) -> &BindingClient {
///         &self.inner
///     }
/// }
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), jsonapi_binding::BindingError> {
/// // Unbound: nothing is fetched, the model is only edited locally.
/// let adapter = TransportAdapter::new(MockTransport::new(), JsonApiFormatter);
/// let (binding, inner) = ResourceBinding::new(BindingConfig::default(), adapter);
/// tokio::spawn(binding.run());
///
/// // model() and update() are provided.
/// let client = AuthorClient { inner };
/// assert!(client.model().await?.is_none());
/// client
///     .update(&Author { kind: "authors".into(), name: "Ada".into() })
///     .await?;
/// assert_eq!(client.model().await?.map(|a| a.name).as_deref(), Some("Ada"));
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait TypedBinding: Send + Sync {
    type Model: Serialize + DeserializeOwned + Send + Sync;

    /// Access the inner generic client.
    fn inner(&self) -> &BindingClient;

    /// The current local model, if one has been set or fetched.
    #[tracing::instrument(skip(self))]
    async fn model(&self) -> Result<Option<Self::Model>, BindingError> {
        tracing::debug!("Reading model");
        match self.inner().state().await?.deserialized {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| FormatError::from(e).into()),
        }
    }

    /// Replaces the local model and returns the derived document.
    #[tracing::instrument(skip(self, model))]
    async fn update(&self, model: &Self::Model) -> Result<WireDocument, BindingError> {
        tracing::debug!("Updating model");
        let value = serde_json::to_value(model).map_err(FormatError::from)?;
        self.inner().update_model(value).await
    }
}
