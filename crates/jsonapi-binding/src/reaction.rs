//! # Reaction Table
//!
//! How a binding responds to its own state changes.
//!
//! Every mutation the binding performs is recorded in a [`ChangeSet`] together
//! with its [`Origin`]. After each mutation the binding calls [`dispatch`],
//! which walks [`REACTIONS`] in a fixed order and runs every reaction whose
//! watched property changed with an origin its predicate accepts.
//!
//! | Reaction          | Watches                   | Accepts         | Effect                                   |
//! |-------------------|---------------------------|-----------------|------------------------------------------|
//! | `unpack-response` | `response`                | any origin      | `data` ← payload, `deserialized` ← model, notify |
//! | `fetch-on-address`| `url`, `resource`         | host            | issue a fetch unless both are empty      |
//! | `serialize-model` | `deserialized`            | host            | `data` ← serialize(model)                |
//!
//! Writes made by reactions are recorded with [`Origin::Derived`] and fed back
//! through the table until nothing changes. Because `serialize-model` only
//! accepts host changes, a model that was just deserialized from a response is
//! never serialized straight back: each transition runs exactly one of the
//! inbound or outbound derivations.

use crate::error::BindingError;
use crate::state::{BindingState, Property};
use crate::transport::TransportAdapter;
use std::sync::Arc;
use tracing::{debug, warn};

/// Who wrote a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The host, through a client call.
    Host,
    /// A completed network call.
    Network,
    /// Another reaction.
    Derived,
}

/// The properties changed by one mutation.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    changes: Vec<(Property, Origin)>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a change. The first origin recorded for a property wins.
    pub fn record(&mut self, property: Property, origin: Origin) {
        if self.origin(property).is_none() {
            self.changes.push((property, origin));
        }
    }

    pub fn origin(&self, property: Property) -> Option<Origin> {
        self.changes
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, origin)| *origin)
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Side effects reactions ask the binding to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Issue a read against the current path.
    Fetch,
    /// Publish `response-changed`.
    Notify { ok: bool },
}

/// What a reaction can see and touch.
pub struct ReactionContext<'a> {
    pub state: &'a mut BindingState,
    pub adapter: &'a TransportAdapter,
    pub wrapper_key: &'a str,
    derived: ChangeSet,
    effects: Vec<Effect>,
}

impl<'a> ReactionContext<'a> {
    pub fn new(state: &'a mut BindingState, adapter: &'a TransportAdapter, wrapper_key: &'a str) -> Self {
        Self {
            state,
            adapter,
            wrapper_key,
            derived: ChangeSet::new(),
            effects: Vec::new(),
        }
    }

    fn write(&mut self, property: Property) {
        self.derived.record(property, Origin::Derived);
    }

    fn fail(&mut self, error: BindingError) {
        self.state.error = Some(Arc::new(error));
    }
}

/// A (property, predicate, effect) triple.
pub struct Reaction {
    pub name: &'static str,
    pub watches: &'static [Property],
    pub predicate: fn(Origin) -> bool,
    pub effect: fn(&mut ReactionContext<'_>),
}

impl Reaction {
    pub fn applies(&self, changes: &ChangeSet) -> bool {
        self.watches
            .iter()
            .filter_map(|property| changes.origin(*property))
            .any(self.predicate)
    }
}

/// Evaluated top to bottom on every dispatch.
pub const REACTIONS: &[Reaction] = &[
    Reaction {
        name: "unpack-response",
        watches: &[Property::Response],
        predicate: any_origin,
        effect: unpack_response,
    },
    Reaction {
        name: "fetch-on-address",
        watches: &[Property::BaseUrl, Property::ResourcePath],
        predicate: from_host,
        effect: fetch_on_address,
    },
    Reaction {
        name: "serialize-model",
        watches: &[Property::Deserialized],
        predicate: from_host,
        effect: serialize_model,
    },
];

/// Runs the reaction table over `changes` and returns the requested effects in
/// the order they were requested.
pub fn dispatch(changes: ChangeSet, ctx: &mut ReactionContext<'_>) -> Vec<Effect> {
    let mut batch = changes;
    while !batch.is_empty() {
        for reaction in REACTIONS {
            if reaction.applies(&batch) {
                debug!(reaction = reaction.name, "Reacting");
                (reaction.effect)(ctx);
            }
        }
        batch = std::mem::take(&mut ctx.derived);
    }
    std::mem::take(&mut ctx.effects)
}

fn any_origin(_: Origin) -> bool {
    true
}

fn from_host(origin: Origin) -> bool {
    origin == Origin::Host
}

fn unpack_response(ctx: &mut ReactionContext<'_>) {
    let document = ctx.state.response.as_ref().and_then(|r| r.data.clone());
    let ok = document.is_some();
    ctx.state.data = document;
    ctx.write(Property::Data);

    let decoded = ctx
        .state
        .data
        .as_ref()
        .map(|document| ctx.adapter.deserialize(document));
    match decoded {
        Some(Ok(model)) => {
            ctx.state.deserialized = Some(model);
            ctx.write(Property::Deserialized);
        }
        Some(Err(e)) => {
            warn!(error = %e, "Payload could not be deserialized");
            ctx.fail(e.into());
        }
        None => debug!("Response carried no payload"),
    }
    ctx.effects.push(Effect::Notify { ok });
}

fn fetch_on_address(ctx: &mut ReactionContext<'_>) {
    if ctx.state.address.is_empty() {
        debug!("Address cleared, nothing to fetch");
        return;
    }
    ctx.effects.push(Effect::Fetch);
}

fn serialize_model(ctx: &mut ReactionContext<'_>) {
    let Some(model) = ctx.state.deserialized.as_ref() else {
        return;
    };
    match ctx.adapter.serialize(model, ctx.wrapper_key) {
        Ok(document) => {
            ctx.state.data = Some(document);
            ctx.write(Property::Data);
        }
        Err(e) => {
            warn!(error = %e, "Local model could not be serialized");
            ctx.fail(e.into());
        }
    }
}
