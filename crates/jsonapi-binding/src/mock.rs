//! # Mock Transport & Testing Guide
//!
//! [`MockTransport`] implements [`Transport`] entirely in memory. Tests queue
//! expectations and replies, hand a clone to a
//! [`TransportAdapter`](crate::TransportAdapter), and drive the binding without
//! a network.
//!
//! ## When to use the mock vs a real server
//!
//! | Feature | MockTransport | HttpTransport + local server |
//! |---------|---------------|------------------------------|
//! | **Speed** | Instant | Fast (loopback socket) |
//! | **Ordering control** | Full (`deferred`) | Delays only |
//! | **Error injection** | `return_err` | Status codes only |
//! | **Use case** | Binding state machine | Wire encoding, headers |
//!
//! ## Example
//!
//! ```
//! use jsonapi_binding::mock::MockTransport;
//! use jsonapi_binding::{
//!     BindingConfig, BindingEvent, JsonApiFormatter, RawResponse, ResourceBinding,
//!     TransportAdapter,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mock = MockTransport::new();
//! mock.expect_get("https://api.example.com/authors/17")
//!     .return_ok(RawResponse::empty(204));
//!
//! let adapter = TransportAdapter::new(mock.clone(), JsonApiFormatter);
//! let config = BindingConfig::new("https://api.example.com", "/authors/17");
//! let (binding, client) = ResourceBinding::new(config, adapter);
//! let mut events = client.subscribe();
//! let task = tokio::spawn(binding.run());
//!
//! // No payload, so the round-trip reports `ok: false`.
//! assert_eq!(events.recv().await?, BindingEvent::ResponseChanged { ok: false });
//!
//! drop(client);
//! task.await?;
//! mock.verify(); // every expectation met, no unexpected calls
//! # Ok(())
//! # }
//! ```
//!
//! ## Controlling completion order
//!
//! [`ExpectationBuilder::deferred`] hands back a [`DeferredReply`]. The request
//! stays pending until the test resolves it, which is how overlapping requests
//! are made to complete in a chosen order.

use crate::document::{RawResponse, WireDocument};
use crate::error::TransportError;
use crate::transport::{Method, Transport};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

type Reply = Result<RawResponse, TransportError>;

enum Pending {
    Ready(Reply),
    Deferred(oneshot::Receiver<Reply>),
}

struct Expectation {
    method: Method,
    path: String,
    reply: Pending,
}

/// A request the mock received.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub body: Option<WireDocument>,
}

/// An in-memory [`Transport`] with expectation tracking.
///
/// Each incoming request consumes the oldest queued expectation with the same
/// method and path. Requests nobody expected fail with
/// [`TransportError::Unexpected`] and make [`verify`](Self::verify) panic.
#[derive(Clone, Default)]
pub struct MockTransport {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    unexpected: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect(&self, method: Method, path: impl Into<String>) -> ExpectationBuilder {
        ExpectationBuilder {
            method,
            path: path.into(),
            expectations: self.expectations.clone(),
        }
    }

    pub fn expect_get(&self, path: impl Into<String>) -> ExpectationBuilder {
        self.expect(Method::Get, path)
    }

    pub fn expect_post(&self, path: impl Into<String>) -> ExpectationBuilder {
        self.expect(Method::Post, path)
    }

    pub fn expect_patch(&self, path: impl Into<String>) -> ExpectationBuilder {
        self.expect(Method::Patch, path)
    }

    pub fn expect_delete(&self, path: impl Into<String>) -> ExpectationBuilder {
        self.expect(Method::Delete, path)
    }

    /// Every request received so far, in arrival order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Verifies that all expectations were met and nothing unexpected arrived.
    pub fn verify(&self) {
        let unexpected = self.unexpected.lock().unwrap();
        if !unexpected.is_empty() {
            panic!("Unexpected requests: {:?}", *unexpected);
        }
        let remaining = self.expectations.lock().unwrap();
        if !remaining.is_empty() {
            let pending: Vec<String> = remaining
                .iter()
                .map(|e| format!("{} {}", e.method, e.path))
                .collect();
            panic!("Not all expectations were met. {} remaining: {:?}", remaining.len(), pending);
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&WireDocument>,
    ) -> Result<RawResponse, TransportError> {
        let call = RecordedCall {
            method,
            path: path.to_string(),
            body: body.cloned(),
        };
        self.calls.lock().unwrap().push(call.clone());

        let expectation = {
            let mut exps = self.expectations.lock().unwrap();
            let position = exps.iter().position(|e| e.method == method && e.path == path);
            position.and_then(|i| exps.remove(i))
        };

        match expectation.map(|e| e.reply) {
            Some(Pending::Ready(reply)) => reply,
            Some(Pending::Deferred(receiver)) => receiver
                .await
                .unwrap_or_else(|_| Err(TransportError::Unexpected("deferred reply dropped".into()))),
            None => {
                self.unexpected.lock().unwrap().push(call);
                Err(TransportError::Unexpected(format!("unexpected request {} {}", method, path)))
            }
        }
    }
}

/// Builder for a queued expectation.
pub struct ExpectationBuilder {
    method: Method,
    path: String,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl ExpectationBuilder {
    fn push(self, reply: Pending) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation {
            method: self.method,
            path: self.path,
            reply,
        });
    }

    /// Replies with `response`.
    pub fn return_ok(self, response: RawResponse) {
        self.push(Pending::Ready(Ok(response)));
    }

    /// Replies `200` with `document` as payload.
    pub fn return_document(self, document: WireDocument) {
        self.return_ok(RawResponse::new(200, document));
    }

    /// Fails with `error`.
    pub fn return_err(self, error: TransportError) {
        self.push(Pending::Ready(Err(error)));
    }

    /// Holds the request open until the returned handle is resolved.
    pub fn deferred(self) -> DeferredReply {
        let (sender, receiver) = oneshot::channel();
        self.push(Pending::Deferred(receiver));
        DeferredReply { sender }
    }
}

/// Releases a deferred request.
pub struct DeferredReply {
    sender: oneshot::Sender<Reply>,
}

impl DeferredReply {
    pub fn resolve(self, response: RawResponse) {
        let _ = self.sender.send(Ok(response));
    }

    pub fn reject(self, error: TransportError) {
        let _ = self.sender.send(Err(error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ResourceObject;

    #[tokio::test]
    async fn test_mock_transport_with_expectations() {
        let mock = MockTransport::new();
        let document = WireDocument::single(ResourceObject::new("authors", "1"));
        mock.expect_get("/authors/1").return_document(document.clone());
        mock.expect_patch("/authors/1")
            .return_err(TransportError::Unexpected("conflict".into()));

        let fetched = mock.request(Method::Get, "/authors/1", None).await.unwrap();
        assert_eq!(fetched.data, Some(document.clone()));

        let patched = mock.request(Method::Patch, "/authors/1", Some(&document)).await;
        assert!(matches!(patched, Err(TransportError::Unexpected(_))));

        assert_eq!(mock.calls()[1].body, Some(document));
        mock.verify();
    }

    #[tokio::test]
    async fn test_matching_is_by_method_and_path() {
        let mock = MockTransport::new();
        mock.expect_get("/b").return_ok(RawResponse::empty(200));
        mock.expect_get("/a").return_ok(RawResponse::empty(201));

        let a = mock.request(Method::Get, "/a", None).await.unwrap();
        let b = mock.request(Method::Get, "/b", None).await.unwrap();
        assert_eq!((a.status, b.status), (201, 200));
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Unexpected requests")]
    async fn test_unexpected_request_fails_verification() {
        let mock = MockTransport::new();
        let result = mock.request(Method::Delete, "/authors/1", None).await;
        assert!(result.is_err());
        mock.verify();
    }

    #[tokio::test]
    async fn test_deferred_reply() {
        let mock = MockTransport::new();
        let reply = mock.expect_get("/slow").deferred();

        let task = {
            let mock = mock.clone();
            tokio::spawn(async move { mock.request(Method::Get, "/slow", None).await })
        };
        reply.resolve(RawResponse::empty(204));

        assert_eq!(task.await.unwrap().unwrap().status, 204);
        mock.verify();
    }
}
