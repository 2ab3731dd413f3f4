//! # Binding Messages
//!
//! The message types exchanged between a [`BindingClient`](crate::BindingClient)
//! and its [`ResourceBinding`](crate::ResourceBinding), plus the completion
//! message spawned requests report back with.

use crate::document::{RawResponse, WireDocument};
use crate::error::{BindingError, TransportError};
use crate::formatter::LocalModel;
use crate::state::BindingState;
use crate::transport::Verb;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the binding.
pub type Response<T> = oneshot::Sender<Result<T, BindingError>>;

/// Requests a host can make of a binding.
///
/// Every variant mutates state synchronously from the binding's point of view;
/// network calls are only *issued* here, their outcome arrives later as a
/// [`Completion`].
#[derive(Debug)]
pub enum BindingRequest {
    /// Assign `url` and/or `resource`. Responds with whether anything changed.
    SetAddress {
        base_url: Option<String>,
        resource_path: Option<String>,
        respond_to: Response<bool>,
    },
    /// Assign `deserialized` as an observed property change.
    SetModel {
        model: LocalModel,
        respond_to: Response<()>,
    },
    /// Assign `deserialized` and derive `data` in one step.
    UpdateModel {
        model: LocalModel,
        respond_to: Response<WireDocument>,
    },
    /// Issue a network call. Responds with the request id once issued.
    Send { verb: Verb, respond_to: Response<u64> },
    Snapshot { respond_to: Response<BindingState> },
}

/// Outcome of a spawned network call.
#[derive(Debug)]
pub struct Completion {
    pub request_id: u64,
    pub verb: Verb,
    pub path: String,
    pub outcome: Result<RawResponse, TransportError>,
}
