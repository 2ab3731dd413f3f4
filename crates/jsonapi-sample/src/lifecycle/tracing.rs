/// Initializes the tracing/logging infrastructure for the application.
///
/// This sets up structured logging using the `tracing` crate with:
/// - **Environment-based filtering**: Controlled via `RUST_LOG`, `info` when unset
/// - **Compact formatting**: One line per event, spans inline
///
/// # Environment Variables
///
/// - `RUST_LOG=info` - Bindings starting, defining and stopping; finished requests
/// - `RUST_LOG=debug` - Every message, reaction and response
/// - `RUST_LOG=jsonapi_binding=trace` - Everything from the binding crate only
///
/// # Example
///
/// ```ignore
/// setup_tracing();
/// tracing::info!("Application started");
/// ```
pub fn setup_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // try_init: tests may install a subscriber more than once.
    let _ = tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
