//! # Binding Errors
//!
//! This module defines the error types used throughout the binding. By
//! centralizing error definitions, the binding loop, the transport adapter and
//! the clients all speak the same vocabulary.
//!
//! There are three layers:
//!
//! - [`TransportError`]: anything the HTTP collaborator rejects with. The binding
//!   treats every variant the same way (a transport failure recorded into the
//!   `error` side channel); the variants only exist for hosts that want to look.
//! - [`FormatError`]: the JSON:API formatter could not serialize or deserialize.
//! - [`BindingError`]: the umbrella type returned by clients and stored in the
//!   side channel.

use crate::document::RawResponse;

/// Failures raised by a [`Transport`](crate::Transport).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request never produced a response (DNS, refused connection, TLS...).
    #[error("Connection to '{path}' failed: {source}")]
    Connection {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    ///
    /// The full reply is kept so hosts can inspect error documents.
    #[error("Server answered {status} for '{path}'")]
    Status {
        path: String,
        status: u16,
        response: RawResponse,
    },

    /// A request body could not be encoded or a response body could not be read.
    #[error("Invalid body for '{path}': {reason}")]
    Body { path: String, reason: String },

    /// The HTTP client itself could not be built (TLS backend, system config).
    #[error("HTTP client could not be built: {0}")]
    Client(#[source] reqwest::Error),

    /// Failure reported by a non-HTTP collaborator (mocks, adapters).
    #[error("Transport failure: {0}")]
    Unexpected(String),
}

impl TransportError {
    /// The HTTP status attached to this failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failures raised by a [`Formatter`](crate::Formatter).
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("No model found under wrapper key '{wrapper_key}'")]
    MissingModel { wrapper_key: String },

    #[error("Value is not a resource: {0}")]
    NotAResource(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by the binding and its clients.
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    #[error("Binding closed")]
    BindingClosed,

    #[error("Binding dropped response channel")]
    BindingDropped,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("Element '{0}' is already defined")]
    AlreadyDefined(String),

    #[error("Element '{0}' is not defined")]
    NotDefined(String),
}

impl BindingError {
    /// True when the error came from the network collaborator.
    pub fn is_transport(&self) -> bool {
        matches!(self, BindingError::Transport(_))
    }
}
