//! # Resource Binding
//!
//! This module defines [`ResourceBinding`], the task that owns a binding's
//! observable state. It is the "server" half: hosts talk to it through a
//! [`BindingClient`], and it processes one message at a time so its state needs
//! no locks.
//!
//! Network calls never block the loop. Each one is spawned onto its own task
//! and reports back on a private completion channel; the loop then writes the
//! outcome into state and runs the reaction table.

use crate::client::BindingClient;
use crate::config::BindingConfig;
use crate::error::{BindingError, TransportError};
use crate::event::BindingEvent;
use crate::hook::{CompletedRequest, NoopHook, RequestHook};
use crate::message::{BindingRequest, Completion};
use crate::reaction::{self, ChangeSet, Effect, Origin, ReactionContext};
use crate::state::{BindingState, Property};
use crate::transport::{TransportAdapter, Verb};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

/// Owns the observable state of one bound resource.
///
/// # Usage Pattern
///
/// 1. **Create**: `ResourceBinding::new()` returns the binding and its client.
/// 2. **Subscribe**: take a `response-changed` receiver from the client before
///    the loop starts if the initial fetch matters.
/// 3. **Run**: spawn `binding.run()`.
///
/// ```
/// use jsonapi_binding::mock::MockTransport;
/// use jsonapi_binding::{
///     BindingConfig, BindingEvent, JsonApiFormatter, ResourceBinding, ResourceObject,
///     TransportAdapter, WireDocument,
/// };
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mock = MockTransport::new();
/// mock.expect_get("https://api.example.com/authors/17").return_document(WireDocument::single(
///     ResourceObject::new("authors", "17").with_attribute("name", "Ada"),
/// ));
///
/// let adapter = TransportAdapter::new(mock.clone(), JsonApiFormatter);
/// let config = BindingConfig::new("https://api.example.com", "/authors/17");
/// let (binding, client) = ResourceBinding::new(config, adapter);
/// let mut events = client.subscribe();
/// let task = tokio::spawn(binding.run());
///
/// let BindingEvent::ResponseChanged { ok } = events.recv().await?;
/// assert!(ok);
/// let model = client.state().await?.deserialized.unwrap_or_default();
/// assert_eq!(model["name"], "Ada");
///
/// drop(client);
/// task.await?;
/// mock.verify();
/// # Ok(())
/// # }
/// ```
///
/// # Ordering
///
/// Requests are never cancelled and completions are applied in the order they
/// arrive, not the order they were issued. Two overlapping fetches leave the
/// response of whichever finished last. Request ids are for logs and hooks only.
pub struct ResourceBinding {
    receiver: mpsc::Receiver<BindingRequest>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions: mpsc::UnboundedReceiver<Completion>,
    events: broadcast::Sender<BindingEvent>,
    adapter: TransportAdapter,
    hook: Arc<dyn RequestHook>,
    wrapper_key: String,
    state: BindingState,
    next_request_id: u64,
    in_flight: usize,
}

impl ResourceBinding {
    /// Creates a binding and its client. Nothing happens until [`run`](Self::run).
    pub fn new(config: BindingConfig, adapter: TransportAdapter) -> (Self, BindingClient) {
        let (sender, receiver) = mpsc::channel(config.buffer_size.max(1));
        let (completions_tx, completions) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        let binding = Self {
            receiver,
            completions_tx,
            completions,
            events: events.clone(),
            adapter,
            hook: Arc::new(NoopHook),
            state: BindingState::new(config.address()),
            wrapper_key: config.wrapper_key,
            next_request_id: 1,
            in_flight: 0,
        };
        (binding, BindingClient::new(sender, events))
    }

    /// Replaces the after-request hook.
    pub fn with_hook(mut self, hook: impl RequestHook) -> Self {
        self.hook = Arc::new(hook);
        self
    }

    /// Like [`with_hook`](Self::with_hook), for a hook shared between bindings.
    pub fn with_shared_hook(mut self, hook: Arc<dyn RequestHook>) -> Self {
        self.hook = hook;
        self
    }

    /// Runs the binding until every client is dropped and every in-flight
    /// request has completed.
    pub async fn run(mut self) {
        info!(path = %self.state.path(), "Binding started");

        // The initial attributes are the first change batch.
        let mut initial = ChangeSet::new();
        if !self.state.address.base_url.is_empty() {
            initial.record(Property::BaseUrl, Origin::Host);
        }
        if !self.state.address.resource_path.is_empty() {
            initial.record(Property::ResourcePath, Origin::Host);
        }
        self.apply(initial);

        loop {
            tokio::select! {
                msg = self.receiver.recv() => match msg {
                    Some(msg) => self.handle(msg),
                    None => break,
                },
                Some(done) = self.completions.recv() => self.complete(done),
            }
        }

        while self.in_flight > 0 {
            match self.completions.recv().await {
                Some(done) => self.complete(done),
                None => break,
            }
        }
        info!(path = %self.state.path(), "Shutdown");
    }

    fn handle(&mut self, msg: BindingRequest) {
        match msg {
            BindingRequest::SetAddress {
                base_url,
                resource_path,
                respond_to,
            } => {
                let mut changes = ChangeSet::new();
                if let Some(base_url) = base_url {
                    if base_url != self.state.address.base_url {
                        self.state.address.base_url = base_url;
                        changes.record(Property::BaseUrl, Origin::Host);
                    }
                }
                if let Some(resource_path) = resource_path {
                    if resource_path != self.state.address.resource_path {
                        self.state.address.resource_path = resource_path;
                        changes.record(Property::ResourcePath, Origin::Host);
                    }
                }
                let changed = !changes.is_empty();
                debug!(path = %self.state.path(), changed, "SetAddress");
                self.apply(changes);
                let _ = respond_to.send(Ok(changed));
            }
            BindingRequest::SetModel { model, respond_to } => {
                debug!(?model, "SetModel");
                self.state.deserialized = Some(model);
                let mut changes = ChangeSet::new();
                changes.record(Property::Deserialized, Origin::Host);
                self.apply(changes);
                let _ = respond_to.send(Ok(()));
            }
            BindingRequest::UpdateModel { model, respond_to } => {
                debug!(?model, "UpdateModel");
                match self.adapter.serialize(&model, &self.wrapper_key) {
                    Ok(document) => {
                        self.state.deserialized = Some(model);
                        self.state.data = Some(document.clone());
                        let _ = respond_to.send(Ok(document));
                    }
                    Err(e) => {
                        warn!(error = %e, "UpdateModel failed");
                        let _ = respond_to.send(Err(e.into()));
                    }
                }
            }
            BindingRequest::Send { verb, respond_to } => {
                let request_id = self.issue(verb);
                let _ = respond_to.send(Ok(request_id));
            }
            BindingRequest::Snapshot { respond_to } => {
                let _ = respond_to.send(Ok(self.state.clone()));
            }
        }
    }

    /// Runs the reaction table over `changes` and performs the fetches it asks
    /// for. Returns the `ok` flag if a notification is due.
    fn apply(&mut self, changes: ChangeSet) -> Option<bool> {
        if changes.is_empty() {
            return None;
        }
        let mut ctx = ReactionContext::new(&mut self.state, &self.adapter, &self.wrapper_key);
        let effects = reaction::dispatch(changes, &mut ctx);

        let mut notify = None;
        for effect in effects {
            match effect {
                Effect::Fetch => {
                    self.issue(Verb::Fetch);
                }
                Effect::Notify { ok } => notify = Some(ok),
            }
        }
        notify
    }

    fn issue(&mut self, verb: Verb) -> u64 {
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.in_flight += 1;

        let path = self.state.path();
        let body = if verb.sends_body() {
            self.state.data.clone()
        } else {
            None
        };
        info!(request_id, %verb, %path, "Request issued");

        let adapter = self.adapter.clone();
        let completions = self.completions_tx.clone();
        let request_path = path.clone();
        let request = tokio::spawn(async move {
            adapter.send(verb, &request_path, body.as_ref()).await
        });
        // A panicking transport still yields a completion.
        tokio::spawn(async move {
            let outcome = match request.await {
                Ok(outcome) => outcome,
                Err(e) => Err(TransportError::Unexpected(format!("request task failed: {e}"))),
            };
            let _ = completions.send(Completion {
                request_id,
                verb,
                path,
                outcome,
            });
        });
        request_id
    }

    fn complete(&mut self, done: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let Completion {
            request_id,
            verb,
            path,
            outcome,
        } = done;

        let ok = match outcome {
            Ok(response) => {
                info!(request_id, %verb, %path, status = response.status, "Request completed");
                self.state.error = None;
                self.state.response = Some(response);
                let mut changes = ChangeSet::new();
                changes.record(Property::Response, Origin::Network);
                self.apply(changes).unwrap_or(false)
            }
            Err(e) => {
                // The previous response stays in place; only the side channel moves.
                warn!(request_id, %verb, %path, error = %e, "Request failed");
                self.state.error = Some(Arc::new(BindingError::from(e)));
                false
            }
        };

        let _ = self.events.send(BindingEvent::ResponseChanged { ok });
        let request = CompletedRequest {
            request_id,
            verb,
            path,
            ok,
        };
        self.hook.after_request(&request, &self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{RawResponse, ResourceObject, WireDocument};
    use crate::formatter::JsonApiFormatter;
    use crate::hook::HookFn;
    use crate::mock::MockTransport;
    use serde_json::json;
    use std::sync::Mutex;

    fn author_document(name: &str) -> WireDocument {
        WireDocument::single(ResourceObject::new("authors", "17").with_attribute("name", name))
    }

    #[tokio::test]
    async fn test_binding_fetches_initial_address_on_start() {
        let mock = MockTransport::new();
        mock.expect_get("https://api.example.com/authors/17")
            .return_ok(RawResponse::new(200, author_document("Ada")));

        let config = BindingConfig::new("https://api.example.com", "/authors/17");
        let (binding, client) =
            ResourceBinding::new(config, TransportAdapter::new(mock.clone(), JsonApiFormatter));
        let mut events = client.subscribe();
        let handle = tokio::spawn(binding.run());

        assert_eq!(events.recv().await.unwrap(), BindingEvent::ResponseChanged { ok: true });
        let state = client.state().await.unwrap();
        assert_eq!(state.deserialized.unwrap()["name"], json!("Ada"));
        mock.verify();

        drop(client);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_address_does_not_fetch() {
        let mock = MockTransport::new();
        let (binding, client) = ResourceBinding::new(
            BindingConfig::default(),
            TransportAdapter::new(mock.clone(), JsonApiFormatter),
        );
        let handle = tokio::spawn(binding.run());

        assert_eq!(client.path().await.unwrap(), "");
        drop(client);
        handle.await.unwrap();
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_hook_runs_after_state_is_written() {
        let mock = MockTransport::new();
        mock.expect_get("/authors/17")
            .return_ok(RawResponse::new(200, author_document("Ada")));
        mock.expect_delete("/authors/17")
            .return_err(crate::error::TransportError::Unexpected("gone".into()));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let hook_seen = seen.clone();
        let hook = HookFn(move |request: &CompletedRequest, state: &BindingState| {
            hook_seen.lock().unwrap().push((
                request.verb,
                request.ok,
                state.response.is_some(),
                state.error.is_some(),
            ));
        });

        let (binding, client) = ResourceBinding::new(
            BindingConfig::new("", "/authors/17"),
            TransportAdapter::new(mock.clone(), JsonApiFormatter),
        );
        let mut events = client.subscribe();
        let handle = tokio::spawn(binding.with_hook(hook).run());

        events.recv().await.unwrap();
        client.delete_resource().await.unwrap();
        assert_eq!(events.recv().await.unwrap(), BindingEvent::ResponseChanged { ok: false });

        drop(client);
        handle.await.unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(Verb::Fetch, true, true, false), (Verb::Delete, false, true, true)]
        );
        mock.verify();
    }

    #[tokio::test]
    async fn test_in_flight_requests_are_drained_on_shutdown() {
        let mock = MockTransport::new();
        let reply = mock.expect_get("/authors/17").deferred();

        let seen = Arc::new(Mutex::new(0));
        let hook_seen = seen.clone();
        let (binding, client) = ResourceBinding::new(
            BindingConfig::new("", "/authors/17"),
            TransportAdapter::new(mock.clone(), JsonApiFormatter),
        );
        let handle = tokio::spawn(
            binding
                .with_hook(HookFn(move |_: &CompletedRequest, _: &BindingState| {
                    *hook_seen.lock().unwrap() += 1;
                }))
                .run(),
        );

        // Make sure the initial fetch was issued before the client goes away.
        client.path().await.unwrap();
        drop(client);
        reply.resolve(RawResponse::empty(204));
        handle.await.unwrap();

        assert_eq!(*seen.lock().unwrap(), 1);
    }

    struct PanickingTransport;

    #[async_trait::async_trait]
    impl crate::transport::Transport for PanickingTransport {
        async fn request(
            &self,
            _method: crate::transport::Method,
            _path: &str,
            _body: Option<&WireDocument>,
        ) -> Result<RawResponse, crate::error::TransportError> {
            panic!("transport bug");
        }
    }

    #[tokio::test]
    async fn test_panicking_transport_fails_the_request_and_still_shuts_down() {
        let (binding, client) = ResourceBinding::new(
            BindingConfig::new("http://localhost", "/authors/17"),
            TransportAdapter::new(PanickingTransport, JsonApiFormatter),
        );
        let mut events = client.subscribe();
        let handle = tokio::spawn(binding.run());

        assert_eq!(events.recv().await.unwrap(), BindingEvent::ResponseChanged { ok: false });
        let state = client.state().await.unwrap();
        assert!(state.response.is_none());
        assert!(state.error.unwrap().is_transport());

        // A second request panics while the client goes away; the drain still ends.
        client.fetch_resource().await.unwrap();
        drop(client);
        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .expect("binding did not shut down")
            .unwrap();
    }
}
