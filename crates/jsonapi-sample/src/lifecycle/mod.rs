//! # System Lifecycle
//!
//! Startup and shutdown for the sample. Individual bindings are simple; this
//! module owns the wiring around them.
//!
//! ## The BindingSystem Pattern
//!
//! [`BindingSystem`] builds one [`BindingRegistry`](jsonapi_binding::BindingRegistry)
//! at startup, defines the `jsonapi-resource` element once, and opens a
//! binding per resource the application touches:
//!
//! ```rust,ignore
//! let mut system = BindingSystem::new()?;
//! let handle = system.open(BindingConfig::new("https://api.example.com", "/authors/17"))?;
//! let ok = next_response(handle.events()).await?;
//! let author = AuthorClient::new(handle.client().clone());
//!
//! drop(author);
//! system.shutdown().await?;
//! ```
//!
//! ## Graceful Shutdown
//!
//! 1. **Drop all clients**: application clones of a binding's client must go first.
//! 2. **Drop the handle's client**: the binding's request channel closes.
//! 3. **Drain**: the binding waits for its in-flight requests, then exits.
//! 4. **Await**: `shutdown` joins every binding task.
//!
//! ## Observability & Tracing
//!
//! [`setup_tracing`] installs the `tracing` subscriber:
//!
//! ```bash
//! RUST_LOG=info cargo run -p jsonapi-sample -- https://api.example.com /authors/17
//! RUST_LOG=jsonapi_binding=debug cargo run -p jsonapi-sample -- ...
//! ```

pub mod binding_system;
pub mod tracing;

pub use binding_system::*;
pub use self::tracing::setup_tracing;
