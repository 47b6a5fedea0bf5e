//! Persistence shape and enumeration views over a signal tree
//!
//! A [`Signal`] tree is transient: it exists only as long as the `GraphError` that
//! carries it is in flight. To survive a checkpoint write and a later restore, it is
//! flattened into the two maps [`signal_to_persistence_maps`] produces, which are
//! exactly the shape [`super::resume::ResumeInfo::populate`] expects back.
//!
//! [`to_interrupt_contexts`] is the read-only, human/tool-facing enumeration of a
//! tree: every node the tree contains, each carrying a link to its parent
//! [`InterruptContext`] even when that parent was filtered out of the returned list.

use super::address::{Address, SegmentType};
use super::resume::ResumeInfo;
use super::tree::{Signal, SignalId};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Flatten a signal tree into the `(address, state)` tables a [`ResumeInfo`] is
/// built from. `root = None` (no interrupt occurred) yields two empty maps.
///
/// Walked in pre-order; every node contributes an address entry, but only nodes
/// that carry component state contribute a state entry.
pub fn signal_to_persistence_maps(root: Option<&Signal>) -> (HashMap<SignalId, Address>, HashMap<SignalId, Value>) {
    let mut addresses = HashMap::new();
    let mut states = HashMap::new();
    if let Some(root) = root {
        collect(root, &mut addresses, &mut states);
    }
    (addresses, states)
}

fn collect(signal: &Signal, addresses: &mut HashMap<SignalId, Address>, states: &mut HashMap<SignalId, Value>) {
    addresses.insert(signal.id().to_string(), signal.address().clone());
    if let Some(state) = signal.state() {
        states.insert(signal.id().to_string(), state.clone());
    }
    for sub in signal.subs() {
        collect(sub, addresses, states);
    }
}

/// Thin constructor wrapper: build a fresh [`ResumeInfo`] directly from the two
/// tables [`signal_to_persistence_maps`] produced (or that a checkpoint store handed
/// back after deserializing them).
pub fn populate_resume_info(address_map: HashMap<SignalId, Address>, state_map: HashMap<SignalId, Value>) -> ResumeInfo {
    ResumeInfo::populate(address_map, state_map)
}

/// One flattened, read-only view of a signal-tree node, suitable for enumeration,
/// inspection, or building a visualization external to this crate.
///
/// `parent` is an owned link rather than an index into the returned `Vec`: a node
/// whose parent was excluded by a type filter still needs a way to reach that
/// parent's address and ID, so the chain is kept alive via `Arc` regardless of
/// which nodes the filter lets through.
#[derive(Debug, Clone)]
pub struct InterruptContext {
    pub id: SignalId,
    pub address: Address,
    pub info: Value,
    pub is_root: bool,
    pub parent: Option<Arc<InterruptContext>>,
}

/// Flatten `root` into a `Vec<InterruptContext>`, restricted to nodes whose final
/// address segment's [`SegmentType`] is in `filter_types` (an empty filter keeps
/// everything, including the root's own empty address, which has no last segment
/// and is therefore dropped by any non-empty filter).
pub fn to_interrupt_contexts(root: &Signal, filter_types: &[SegmentType]) -> Vec<InterruptContext> {
    let mut out = Vec::new();
    walk(root, None, filter_types, &mut out);
    out
}

fn walk(signal: &Signal, parent: Option<Arc<InterruptContext>>, filter_types: &[SegmentType], out: &mut Vec<InterruptContext>) {
    let node = InterruptContext {
        id: signal.id().to_string(),
        address: signal.address().clone(),
        info: signal.info().clone(),
        is_root: signal.is_root(),
        parent,
    };
    let node = Arc::new(node);

    let passes = if filter_types.is_empty() {
        true
    } else {
        signal
            .address()
            .last()
            .map(|seg| filter_types.contains(&seg.kind()))
            .unwrap_or(false)
    };
    if passes {
        out.push((*node).clone());
    }

    for sub in signal.subs() {
        walk(sub, Some(node.clone()), filter_types, out);
    }
}
