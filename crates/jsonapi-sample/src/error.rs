//! Error types for the author client.

use jsonapi_binding::BindingError;
use thiserror::Error;

/// Errors that can occur during author operations.
#[derive(Debug, Error)]
pub enum AuthorError {
    /// No author model is loaded yet (nothing fetched, or the server replied
    /// without a payload).
    #[error("Author not loaded")]
    NotLoaded,

    /// The binding stopped before the awaited response arrived.
    #[error("Binding stopped before a response arrived")]
    NoResponse,

    /// The server rejected the request or could not be reached.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error(transparent)]
    Binding(#[from] BindingError),
}
