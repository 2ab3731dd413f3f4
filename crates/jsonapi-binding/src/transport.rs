//! # Transport Adapter
//!
//! The thin seam between the binding and its two external collaborators: an
//! HTTP client ([`Transport`]) and a JSON:API formatter
//! ([`Formatter`](crate::Formatter)).
//!
//! The adapter owns no state. It exposes the four verbs the binding issues
//! against its current path, plus `serialize`/`deserialize` pass-throughs.
//! There are no retries, no timeouts and no caching here: failures propagate to
//! the caller untouched.

use crate::document::{RawResponse, WireDocument};
use crate::error::{FormatError, TransportError};
use crate::formatter::{Formatter, LocalModel};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// HTTP methods the binding uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// The operations a binding can issue against its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// Read. No request body.
    Fetch,
    /// Create. Sends the current wire document.
    Create,
    /// Update. Sends the current wire document.
    Replace,
    Delete,
}

impl Verb {
    pub fn method(self) -> Method {
        match self {
            Verb::Fetch => Method::Get,
            Verb::Create => Method::Post,
            Verb::Replace => Method::Patch,
            Verb::Delete => Method::Delete,
        }
    }

    pub fn sends_body(self) -> bool {
        matches!(self, Verb::Create | Verb::Replace)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Fetch => "fetch",
            Verb::Create => "create",
            Verb::Replace => "replace",
            Verb::Delete => "delete",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The HTTP collaborator.
///
/// Resolves with the raw response or fails with a [`TransportError`]. A
/// non-success status is a failure, exactly like a refused connection.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&WireDocument>,
    ) -> Result<RawResponse, TransportError>;
}

/// Pairs a [`Transport`] with a [`Formatter`]. Cheap to clone.
#[derive(Clone)]
pub struct TransportAdapter {
    transport: Arc<dyn Transport>,
    formatter: Arc<dyn Formatter>,
}

impl TransportAdapter {
    pub fn new(transport: impl Transport, formatter: impl Formatter) -> Self {
        Self {
            transport: Arc::new(transport),
            formatter: Arc::new(formatter),
        }
    }

    pub async fn fetch(&self, path: &str) -> Result<RawResponse, TransportError> {
        self.transport.request(Method::Get, path, None).await
    }

    pub async fn create(
        &self,
        path: &str,
        body: Option<&WireDocument>,
    ) -> Result<RawResponse, TransportError> {
        self.transport.request(Method::Post, path, body).await
    }

    pub async fn replace(
        &self,
        path: &str,
        body: Option<&WireDocument>,
    ) -> Result<RawResponse, TransportError> {
        self.transport.request(Method::Patch, path, body).await
    }

    pub async fn delete(&self, path: &str) -> Result<RawResponse, TransportError> {
        self.transport.request(Method::Delete, path, None).await
    }

    /// Issues `verb` against `path`. The body is dropped for verbs that do
    /// not send one.
    pub async fn send(
        &self,
        verb: Verb,
        path: &str,
        body: Option<&WireDocument>,
    ) -> Result<RawResponse, TransportError> {
        match verb {
            Verb::Fetch => self.fetch(path).await,
            Verb::Create => self.create(path, body).await,
            Verb::Replace => self.replace(path, body).await,
            Verb::Delete => self.delete(path).await,
        }
    }

    pub fn serialize(&self, model: &LocalModel, wrapper_key: &str) -> Result<WireDocument, FormatError> {
        self.formatter.serialize(model, wrapper_key)
    }

    pub fn deserialize(&self, document: &WireDocument) -> Result<LocalModel, FormatError> {
        self.formatter.deserialize(document)
    }
}
