//! # Author Client
//!
//! Provides a high-level API for an author resource. It wraps a
//! [`BindingClient`] and exposes domain-specific methods.
use crate::error::AuthorError;
use crate::model::Author;
use async_trait::async_trait;
use jsonapi_binding::{BindingClient, TypedBinding};
use tracing::{debug, instrument};

/// Client for a bound `authors` resource.
#[derive(Clone)]
pub struct AuthorClient {
    inner: BindingClient,
}

impl AuthorClient {
    pub fn new(inner: BindingClient) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl TypedBinding for AuthorClient {
    type Model = Author;

    fn inner(&self) -> &BindingClient {
        &self.inner
    }
}

impl AuthorClient {
    /// The loaded author.
    #[instrument(skip(self))]
    pub async fn author(&self) -> Result<Author, AuthorError> {
        self.model().await?.ok_or(AuthorError::NotLoaded)
    }

    /// POSTs a new author to the bound path.
    #[instrument(skip(self))]
    pub async fn create_author(&self, author: Author) -> Result<u64, AuthorError> {
        debug!("Sending request");
        self.update(&author).await?;
        Ok(self.inner.create_resource().await?)
    }

    /// Renames the loaded author locally and PATCHes the change.
    #[instrument(skip(self))]
    pub async fn rename(&self, name: &str) -> Result<u64, AuthorError> {
        let mut author = self.author().await?;
        author.name = name.to_string();
        self.update(&author).await?;
        debug!("Sending request");
        Ok(self.inner.replace_resource().await?)
    }

    #[instrument(skip(self))]
    pub async fn remove(&self) -> Result<u64, AuthorError> {
        debug!("Sending request");
        Ok(self.inner.delete_resource().await?)
    }

    /// Fails with the recorded transport error, if the last round-trip failed.
    pub async fn check(&self) -> Result<(), AuthorError> {
        match self.inner.state().await?.error {
            Some(error) => Err(AuthorError::RequestFailed(error.to_string())),
            None => Ok(()),
        }
    }
}
