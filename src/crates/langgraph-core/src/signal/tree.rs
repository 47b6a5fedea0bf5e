//! The signal tree: interrupts as error values
//!
//! A [`Signal`] is an interrupt, represented as a tree so that several concurrent
//! children (parallel tool calls, say) can be aggregated into one composite without
//! losing their individual identity, address, or state. `Signal` implements
//! [`std::error::Error`] so it can be returned from any callee, wrapped inside
//! [`crate::error::GraphError`], and rediscovered anywhere in a standard error chain
//! via [`is_interrupt_signal`].

use super::address::Address;
use super::context;
use crate::error::GraphError;
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Opaque, execution-unique identifier for a [`Signal`]. Globally unique is not
/// required, only unique within one execution.
pub type SignalId = String;

fn new_signal_id() -> SignalId {
    format!("int-{}", Uuid::new_v4().simple())
}

/// Tree-shaped interrupt node.
///
/// `is_root` marks an actual interrupt *origination* site (a leaf that was not
/// built by aggregating other signals); a composite built from at least one
/// signal-carrying child has `is_root = false`. The tree is built bottom-up as
/// errors propagate and is never mutated after construction.
#[derive(Debug, Clone)]
pub struct Signal {
    id: SignalId,
    address: Address,
    info: Value,
    state: Option<Value>,
    subs: Vec<Signal>,
    is_root: bool,
}

impl Signal {
    /// The ID minted for this signal.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The address at which this signal originated (or, for a composite, the
    /// address of the frame that aggregated its children).
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The human/decision-facing payload.
    pub fn info(&self) -> &Value {
        &self.info
    }

    /// Opaque per-site component state, if any.
    pub fn state(&self) -> Option<&Value> {
        self.state.as_ref()
    }

    /// Child signals, in construction order.
    pub fn subs(&self) -> &[Signal] {
        &self.subs
    }

    /// Whether this is an actual interrupt origination site.
    pub fn is_root(&self) -> bool {
        self.is_root
    }

    fn leaf(info: Value, state: Option<Value>) -> Self {
        Self {
            id: new_signal_id(),
            address: context::current_address(),
            info,
            state,
            subs: Vec::new(),
            is_root: true,
        }
    }

    fn composite(info: Value, state: Option<Value>, subs: Vec<Signal>) -> Self {
        let is_root = subs.is_empty();
        Self {
            id: new_signal_id(),
            address: context::current_address(),
            info,
            state,
            subs,
            is_root,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "interrupt signal [{}] at {}: {}",
            self.id,
            self.address.to_canonical_string(),
            self.info
        )
    }
}

impl std::error::Error for Signal {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.subs.first().map(|s| s as &(dyn std::error::Error + 'static))
    }
}

/// Construct a leaf interrupt with no component state.
///
/// Reads the current address from the ambient address context (empty if none is
/// installed). Returns a [`GraphError`] ready to be handed back with `return
/// Err(...)` or propagated with `?`.
pub fn simple_signal(info: impl Into<Value>) -> GraphError {
    GraphError::Signal(Signal::leaf(info.into(), None))
}

/// Construct a leaf interrupt carrying opaque component state to be saved and
/// later re-injected on resume.
pub fn stateful_signal(info: impl Into<Value>, state: impl Into<Value>) -> GraphError {
    GraphError::Signal(Signal::leaf(info.into(), Some(state.into())))
}

/// Aggregate zero or more sibling errors into one composite signal.
///
/// Every element of `errors` that is (or wraps) a [`Signal`] contributes a child;
/// any other error is discarded for signal-tree purposes — the executor is
/// responsible for surfacing real errors separately, before they reach this
/// boundary. If none of `errors` carried a signal, the result degrades to a root
/// signal with no children.
pub fn composite_signal(
    info: impl Into<Value>,
    state: Option<Value>,
    errors: impl IntoIterator<Item = GraphError>,
) -> GraphError {
    let subs: Vec<Signal> = errors
        .into_iter()
        .filter_map(|err| is_interrupt_signal(&err).cloned())
        .collect();
    GraphError::Signal(Signal::composite(info.into(), state, subs))
}

/// Walk `err`'s standard error chain looking for a [`Signal`] anywhere in it.
///
/// This is how a `Signal` wrapped inside `GraphError::Signal` (or inside any other
/// crate's boxed error type, as long as it forwards `source()`) is rediscovered.
pub fn is_interrupt_signal(err: &(dyn std::error::Error + 'static)) -> Option<&Signal> {
    let mut cur: &(dyn std::error::Error + 'static) = err;
    loop {
        if let Some(signal) = cur.downcast_ref::<Signal>() {
            return Some(signal);
        }
        match std::error::Error::source(cur) {
            Some(next) => cur = next,
            None => return None,
        }
    }
}
