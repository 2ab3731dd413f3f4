//! Notifications a binding publishes to its host.

/// Emitted by a binding on its broadcast channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingEvent {
    /// A network round-trip completed. `ok` is true iff the reply carried a
    /// payload; failures always report `false`.
    ResponseChanged { ok: bool },
}

impl BindingEvent {
    /// The event name as a host element would dispatch it.
    pub fn name(&self) -> &'static str {
        match self {
            BindingEvent::ResponseChanged { .. } => "response-changed",
        }
    }
}
