//! Scoped Resume Info: the per-execution registry of saved state and resume data
//!
//! [`ResumeInfo`] is keyed by [`SignalId`] and holds, for each ID, the address it
//! was recorded at, any saved component state, any supplied resume payload, and
//! whether each of those has already been consumed. All five maps are guarded by a
//! single mutex (per spec: consumption decisions must be atomic with the lookup
//! that drives them), matching the single-lock model [`super::context`] relies on
//! when it injects state into a newly-pushed [`super::context::AddressContext`].

use super::address::Address;
use super::tree::SignalId;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct ResumeInfoInner {
    address: HashMap<SignalId, Address>,
    state: HashMap<SignalId, Value>,
    /// `Some(None)` is an explicit resume-with-no-payload entry, distinct from the
    /// key being absent entirely.
    resume_data: HashMap<SignalId, Option<Value>>,
    state_consumed: HashMap<SignalId, bool>,
    data_consumed: HashMap<SignalId, bool>,
}

/// Per-execution registry mapping interrupt IDs to their saved state and resume
/// payload. Lives for the duration of one execution; install it as the ambient
/// root scope with [`super::context::with_resume_info`] and discard it afterward.
#[derive(Default)]
pub struct ResumeInfo(Mutex<ResumeInfoInner>);

impl ResumeInfo {
    /// A fresh, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a registry from the two tables [`super::persistence::signal_to_persistence_maps`]
    /// produced.
    ///
    /// Addresses are deep-copied on entry (an owned `HashMap` clone of owned
    /// `Address`es already is one) so that later external mutation of the caller's
    /// copy cannot corrupt this registry. States and resume data are not
    /// separately deep-copied: they are treated as immutable-by-convention JSON
    /// values handed over once, never mutated in place after construction here.
    pub fn populate(address_map: HashMap<SignalId, Address>, state_map: HashMap<SignalId, Value>) -> Self {
        let address = address_map.clone();
        Self(Mutex::new(ResumeInfoInner {
            address,
            state: state_map,
            resume_data: HashMap::new(),
            state_consumed: HashMap::new(),
            data_consumed: HashMap::new(),
        }))
    }

    /// Mark each of `ids` as a resume target with no payload.
    pub fn resume(&self, ids: impl IntoIterator<Item = impl Into<SignalId>>) {
        let mut inner = self.0.lock().unwrap();
        for id in ids {
            let id = id.into();
            inner.resume_data.insert(id, None);
        }
    }

    /// Mark `id` as a resume target carrying `data`.
    pub fn resume_with_data(&self, id: impl Into<SignalId>, data: impl Into<Value>) {
        let mut inner = self.0.lock().unwrap();
        inner.resume_data.insert(id.into(), Some(data.into()));
    }

    /// Bulk form of [`Self::resume_with_data`].
    pub fn batch_resume_with_data(&self, map: HashMap<SignalId, Value>) {
        let mut inner = self.0.lock().unwrap();
        for (id, data) in map {
            inner.resume_data.insert(id, Some(data));
        }
    }

    /// Lock the registry and run the injection decision for address `new`,
    /// mutating `ctx` in place. Called once per push from [`super::context::push`].
    pub(super) fn inject(&self, new: &Address, ctx: &mut super::context::AddressContext) {
        let mut inner = self.0.lock().unwrap();
        let ids: Vec<SignalId> = inner.address.keys().cloned().collect();

        for id in ids {
            let addr = inner.address.get(&id).cloned().unwrap();

            if new == &addr {
                let state_already_consumed = *inner.state_consumed.get(&id).unwrap_or(&false);
                if !state_already_consumed {
                    if let Some(state) = inner.state.get(&id).cloned() {
                        ctx.interrupt_state = Some(state);
                        ctx.has_interrupt_state = true;
                        inner.state_consumed.insert(id.clone(), true);
                    }
                }

                let data_already_consumed = *inner.data_consumed.get(&id).unwrap_or(&false);
                if !data_already_consumed {
                    if let Some(data_entry) = inner.resume_data.get(&id).cloned() {
                        ctx.resume_data = data_entry;
                        ctx.has_resume_data = true;
                        ctx.is_resume_target = true;
                        inner.data_consumed.insert(id.clone(), true);
                        tracing::debug!(signal_id = %id, address = %new.to_canonical_string(), "resume payload consumed");
                    }
                }
            } else if addr.is_descendant_of(new) {
                let data_already_consumed = *inner.data_consumed.get(&id).unwrap_or(&false);
                let has_entry = inner.resume_data.contains_key(&id);
                if has_entry && !data_already_consumed {
                    ctx.is_resume_target = true;
                }
            }
        }
    }
}

/// Resume-initiator-facing free function: mark `ids` as resume targets with no
/// payload, lazily creating a fresh registry if `existing` is `None`.
pub fn resume(existing: Option<Arc<ResumeInfo>>, ids: impl IntoIterator<Item = impl Into<SignalId>>) -> Arc<ResumeInfo> {
    let info = existing.unwrap_or_else(|| Arc::new(ResumeInfo::new()));
    info.resume(ids);
    info
}

/// Resume-initiator-facing free function: mark `id` as a resume target carrying
/// `data`, lazily creating a fresh registry if `existing` is `None`.
pub fn resume_with_data(existing: Option<Arc<ResumeInfo>>, id: impl Into<SignalId>, data: impl Into<Value>) -> Arc<ResumeInfo> {
    let info = existing.unwrap_or_else(|| Arc::new(ResumeInfo::new()));
    info.resume_with_data(id, data);
    info
}

/// Resume-initiator-facing free function: bulk form of [`resume_with_data`].
pub fn batch_resume_with_data(existing: Option<Arc<ResumeInfo>>, map: HashMap<SignalId, Value>) -> Arc<ResumeInfo> {
    let info = existing.unwrap_or_else(|| Arc::new(ResumeInfo::new()));
    info.batch_resume_with_data(map);
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::address::AddressSegment;
    use crate::signal::context::AddressContext;

    #[test]
    fn resume_without_existing_registry_lazily_creates_one() {
        // No address was ever recorded for "int-1" (no populate/restore happened),
        // so injection has nothing to match against yet -- the call must still
        // succeed rather than requiring a prior `populate`.
        let info = resume(None, vec!["int-1".to_string()]);
        let mut ctx = AddressContext::for_address(Address::root());
        info.inject(&Address::root(), &mut ctx);
        assert!(!ctx.is_resume_target);
        assert!(!ctx.has_resume_data);
    }

    #[test]
    fn resume_with_no_payload_marks_target_without_data() {
        let addr = Address::root().append(AddressSegment::node("batch"));
        let mut addr_map = HashMap::new();
        addr_map.insert("int-1".to_string(), addr.clone());
        let info = ResumeInfo::populate(addr_map, HashMap::new());
        info.resume(vec!["int-1".to_string()]);

        let mut ctx = AddressContext::for_address(addr.clone());
        info.inject(&addr, &mut ctx);
        assert!(ctx.is_resume_target);
        assert!(ctx.has_resume_data);
        assert_eq!(ctx.resume_data, None);
    }

    #[test]
    fn exact_match_injects_state_and_marks_consumed_once() {
        let mut addr_map = HashMap::new();
        let addr = Address::root().append(AddressSegment::node("review"));
        addr_map.insert("int-1".to_string(), addr.clone());
        let mut state_map = HashMap::new();
        state_map.insert("int-1".to_string(), serde_json::json!({"progress": 2}));

        let info = ResumeInfo::populate(addr_map, state_map);
        info.resume_with_data("int-1", serde_json::json!({"approved": true}));

        let mut ctx1 = AddressContext::for_address(addr.clone());
        info.inject(&addr, &mut ctx1);
        assert!(ctx1.has_interrupt_state);
        assert_eq!(ctx1.interrupt_state, Some(serde_json::json!({"progress": 2})));
        assert!(ctx1.is_resume_target);
        assert!(ctx1.has_resume_data);

        // Second push of the same address: state/data already consumed.
        let mut ctx2 = AddressContext::for_address(addr.clone());
        info.inject(&addr, &mut ctx2);
        assert!(!ctx2.has_interrupt_state);
        assert!(!ctx2.has_resume_data);
    }

    #[test]
    fn ancestor_match_marks_target_without_consuming() {
        let mut addr_map = HashMap::new();
        let descendant = Address::root()
            .append(AddressSegment::node("a"))
            .append(AddressSegment::subgraph("b"))
            .append(AddressSegment::node("c"));
        addr_map.insert("int-1".to_string(), descendant.clone());
        let info = ResumeInfo::populate(addr_map, HashMap::new());
        info.resume_with_data("int-1", serde_json::json!("x"));

        let ancestor = Address::root().append(AddressSegment::node("a"));
        let mut ctx = AddressContext::for_address(ancestor.clone());
        info.inject(&ancestor, &mut ctx);
        assert!(ctx.is_resume_target);
        assert!(!ctx.has_resume_data);

        let mid = ancestor.append(AddressSegment::subgraph("b"));
        let mut ctx_mid = AddressContext::for_address(mid.clone());
        info.inject(&mid, &mut ctx_mid);
        assert!(ctx_mid.is_resume_target);
        assert!(!ctx_mid.has_resume_data);

        let mut ctx_leaf = AddressContext::for_address(descendant.clone());
        info.inject(&descendant, &mut ctx_leaf);
        assert!(ctx_leaf.is_resume_target);
        assert!(ctx_leaf.has_resume_data);
        assert_eq!(ctx_leaf.resume_data, Some(serde_json::json!("x")));
    }

    #[test]
    fn multiple_ids_at_same_address_all_consumed_together() {
        let addr = Address::root().append(AddressSegment::node("n"));
        let mut addr_map = HashMap::new();
        addr_map.insert("int-1".to_string(), addr.clone());
        addr_map.insert("int-2".to_string(), addr.clone());
        let info = ResumeInfo::populate(addr_map, HashMap::new());
        info.resume_with_data("int-1", serde_json::json!(1));
        info.resume_with_data("int-2", serde_json::json!(2));

        let mut ctx = AddressContext::for_address(addr.clone());
        info.inject(&addr, &mut ctx);
        assert!(ctx.has_resume_data);

        let mut ctx2 = AddressContext::for_address(addr.clone());
        info.inject(&addr, &mut ctx2);
        assert!(!ctx2.has_resume_data);
    }
}
