//! # After-Request Hook
//!
//! An extension point run by the binding after every completed request, once
//! the outcome has been written into state and the notification has gone out.
//! It is injected at construction time and does nothing by default.

use crate::state::BindingState;
use crate::transport::Verb;

/// What the hook learns about the request that just completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedRequest {
    pub request_id: u64,
    pub verb: Verb,
    pub path: String,
    /// Same flag as the `response-changed` notification.
    pub ok: bool,
}

/// Strategy invoked after every request.
pub trait RequestHook: Send + Sync + 'static {
    fn after_request(&self, _request: &CompletedRequest, _state: &BindingState) {}
}

/// The default hook.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl RequestHook for NoopHook {}

/// Adapts a closure into a [`RequestHook`].
///
/// ```
/// use jsonapi_binding::mock::MockTransport;
/// use jsonapi_binding::{
///     BindingConfig, BindingState, CompletedRequest, HookFn, JsonApiFormatter, ResourceBinding,
///     TransportAdapter,
/// };
///
/// let hook = HookFn(|request: &CompletedRequest, _: &BindingState| {
///     tracing::info!(request_id = request.request_id, "done");
/// });
/// let adapter = TransportAdapter::new(MockTransport::new(), JsonApiFormatter);
/// let (binding, _client) = ResourceBinding::new(BindingConfig::default(), adapter);
/// let _binding = binding.with_hook(hook);
/// ```
pub struct HookFn<F>(pub F);

impl<F> RequestHook for HookFn<F>
where
    F: Fn(&CompletedRequest, &BindingState) + Send + Sync + 'static,
{
    fn after_request(&self, request: &CompletedRequest, state: &BindingState) {
        (self.0)(request, state)
    }
}
