//! # JSON:API Binding
//!
//! This crate binds a host's attribute state to a remote JSON:API resource. The
//! host sets a base URL and a resource path; the binding fetches the resource,
//! deserializes it into a local model, re-serializes local edits, and publishes
//! every completed round-trip as a `response-changed` notification.
//!
//! ## Moving Parts
//!
//! - **[`ResourceBinding`]**: the task that owns the observable state
//!   (`url`, `resource`, `response`, `data`, `deserialized`, derived `path`)
//!   and reacts to changes through an explicit [reaction table](reaction).
//! - **[`BindingClient`]**: the cloneable host handle. Setters, the four
//!   network verbs, `update_model`, snapshots and subscriptions.
//! - **[`TransportAdapter`]**: the stateless seam to the HTTP collaborator
//!   ([`Transport`], e.g. [`HttpTransport`]) and the JSON:API collaborator
//!   ([`Formatter`], e.g. [`JsonApiFormatter`]).
//! - **[`BindingRegistry`]**: tag-name registry built once at startup.
//!
//! ## Data Flow
//!
//! ```text
//!  host ──set url/resource──▶ ResourceBinding ──fetch──▶ Transport
//!                                   ▲                        │
//!                                   └──── RawResponse ◀──────┘
//!                                   │
//!          response ─▶ data ─▶ deserialized      (inbound, on every completion)
//!          deserialized ─▶ data                  (outbound, on host edits)
//! ```
//!
//! Exactly one of the two derivations runs per transition, so a freshly
//! deserialized model is never serialized straight back.
//!
//! ## Concurrency Model
//!
//! Each binding runs in its own Tokio task and handles one message at a time,
//! so its state needs no locks. Network calls are spawned and report back to
//! the binding; overlapping requests are not cancelled and the last one to
//! complete wins.
//!
//! ## Errors
//!
//! A transport failure never stops the binding. It is written to the `error`
//! side channel of [`BindingState`], the previous response is left in place,
//! and `response-changed` fires with `ok: false`.
//!
//! ## Observability
//!
//! Everything is instrumented with `tracing`. Set up a subscriber in the host
//! application and filter with `RUST_LOG`.
//!
//! ## Testing
//!
//! See the [`mock`] module for an in-memory transport with expectations and
//! deferred replies.

pub mod binding;
pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod event;
pub mod formatter;
pub mod hook;
pub mod http;
pub mod message;
pub mod mock;
pub mod reaction;
pub mod registry;
pub mod state;
pub mod transport;
pub mod typed;

// Re-export core types for convenience
pub use binding::ResourceBinding;
pub use client::BindingClient;
pub use config::{BindingConfig, DEFAULT_WRAPPER_KEY};
pub use document::{
    Linkage, PrimaryData, RawResponse, Relationship, ResourceIdentifier, ResourceObject,
    WireDocument,
};
pub use error::{BindingError, FormatError, TransportError};
pub use event::BindingEvent;
pub use formatter::{Formatter, JsonApiFormatter, LocalModel};
pub use hook::{CompletedRequest, HookFn, NoopHook, RequestHook};
pub use http::{HttpTransport, JSON_API_MEDIA_TYPE};
pub use message::{BindingRequest, Completion, Response};
pub use registry::{BindingDefinition, BindingHandle, BindingRegistry};
pub use state::{Address, BindingState, Property};
pub use transport::{Method, Transport, TransportAdapter, Verb};
pub use typed::TypedBinding;
