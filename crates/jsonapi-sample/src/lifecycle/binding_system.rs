use crate::error::AuthorError;
use jsonapi_binding::{
    BindingConfig, BindingDefinition, BindingError, BindingEvent, BindingHandle, BindingRegistry,
    BindingState, CompletedRequest, HttpTransport, JsonApiFormatter, RequestHook, Transport,
    TransportAdapter,
};
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Tag name of the resource element.
pub const RESOURCE_TAG: &str = "jsonapi-resource";

/// Runtime orchestrator for the sample's bindings.
///
/// `BindingSystem` is responsible for:
/// - **Definition**: building the registry and defining [`RESOURCE_TAG`] once
/// - **Lifecycle**: spawning bindings and joining them on shutdown
///
/// # Example
///
/// ```
/// use jsonapi_binding::mock::MockTransport;
/// use jsonapi_binding::{BindingConfig, RawResponse};
/// use jsonapi_sample::lifecycle::{next_response, BindingSystem};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = MockTransport::new();
/// transport
///     .expect_get("https://api.example.com/authors")
///     .return_ok(RawResponse::empty(204));
///
/// let mut system = BindingSystem::with_transport(transport)?;
/// let handle = system.open(BindingConfig::new("https://api.example.com", "/authors"))?;
/// assert!(!next_response(handle.events()).await?);
///
/// system.shutdown().await?;
/// # Ok(())
/// # }
/// ```
pub struct BindingSystem {
    registry: BindingRegistry,

    /// Every binding opened so far (used for graceful shutdown).
    handles: Vec<BindingHandle>,
}

impl BindingSystem {
    /// A system talking HTTP.
    pub fn new() -> Result<Self, BindingError> {
        Self::with_transport(HttpTransport::new()?)
    }

    /// A system over any transport; tests pass a mock here.
    pub fn with_transport(transport: impl Transport) -> Result<Self, BindingError> {
        let mut registry = BindingRegistry::new();
        registry.define(
            RESOURCE_TAG,
            BindingDefinition::new(TransportAdapter::new(transport, JsonApiFormatter))
                .with_hook(RequestLog),
        )?;
        Ok(Self {
            registry,
            handles: Vec::new(),
        })
    }

    /// Spawns a binding for `config`. A non-empty path is fetched right away.
    pub fn open(&mut self, config: BindingConfig) -> Result<&mut BindingHandle, BindingError> {
        let handle = self.registry.create(RESOURCE_TAG, config)?;
        let index = self.handles.len();
        self.handles.push(handle);
        Ok(&mut self.handles[index])
    }

    /// Gracefully shuts down every binding.
    ///
    /// Clones of the bindings' clients held elsewhere must be dropped first,
    /// otherwise this waits for them.
    pub async fn shutdown(self) -> Result<(), BindingError> {
        info!(bindings = self.handles.len(), "Shutting down binding system");
        for handle in self.handles {
            handle.shutdown().await?;
        }
        info!("Binding system shut down");
        Ok(())
    }
}

/// Waits for the next `response-changed` and returns its `ok` flag.
pub async fn next_response(
    events: &mut broadcast::Receiver<BindingEvent>,
) -> Result<bool, AuthorError> {
    loop {
        match events.recv().await {
            Ok(BindingEvent::ResponseChanged { ok }) => return Ok(ok),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Missed response notifications");
            }
            Err(broadcast::error::RecvError::Closed) => return Err(AuthorError::NoResponse),
        }
    }
}

/// Logs every finished round-trip.
struct RequestLog;

impl RequestHook for RequestLog {
    fn after_request(&self, request: &CompletedRequest, state: &BindingState) {
        match &state.error {
            Some(error) if !request.ok => warn!(
                request_id = request.request_id,
                verb = %request.verb,
                path = %request.path,
                error = %error,
                "Request failed"
            ),
            _ => info!(
                request_id = request.request_id,
                verb = %request.verb,
                path = %request.path,
                ok = request.ok,
                status = state.response.as_ref().map(|r| r.status),
                "Request finished"
            ),
        }
    }
}
