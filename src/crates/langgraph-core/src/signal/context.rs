//! Address Context: the ambient, scoped state every interrupt site reads and writes
//!
//! [`AddressContext`] is carried via [`tokio::task_local!`] rather than the
//! `thread_local!` + `RwLock` pattern used elsewhere in this crate, because a fan-out
//! point (e.g. `futures::future::join_all` over parallel node tasks) polls sibling
//! futures concurrently on one OS thread inside one Tokio task. A `thread_local!`
//! slot is keyed by OS thread, not by future, so siblings polled on the same thread
//! would corrupt each other's address. `task_local!`'s `.scope()` binds the value to
//! one specific future tree regardless of which thread polls it, which is what
//! isolation across parallel branches actually requires here.
//!
//! The second task-local, `RESUME_INFO`, is the ambient [`super::resume::ResumeInfo`]
//! installed once at the root of an execution via [`with_resume_info`]. It is
//! consulted, never mutated, by [`push`] on every address append.

use super::address::{Address, AddressSegment};
use super::resume::ResumeInfo;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

tokio::task_local! {
    pub(crate) static ADDRESS_CONTEXT: AddressContext;
    static RESUME_INFO: Arc<ResumeInfo>;
}

/// The per-address frame threaded through one branch of execution.
///
/// `has_interrupt_state` / `has_resume_data` record that an injection *happened* at
/// this address, independent of whether the injected value is non-null or of the
/// type a caller later asks for — see [`get_interrupt_state`] and
/// [`get_resume_context`], which compute the caller-facing `hasState`/`hasData` bits
/// from the stored value itself.
#[derive(Debug, Clone)]
pub struct AddressContext {
    address: Address,
    pub(super) interrupt_state: Option<Value>,
    pub(super) has_interrupt_state: bool,
    pub(super) resume_data: Option<Value>,
    pub(super) has_resume_data: bool,
    pub(super) is_resume_target: bool,
}

impl AddressContext {
    /// A fresh frame for `address` with no injected state, data, or target marker.
    pub fn for_address(address: Address) -> Self {
        Self {
            address,
            interrupt_state: None,
            has_interrupt_state: false,
            resume_data: None,
            has_resume_data: false,
            is_resume_target: false,
        }
    }
}

/// The current address, or [`Address::root`] if no context is installed (e.g. in a
/// plain unit test that never entered [`with_address_segment`]).
pub fn current_address() -> Address {
    ADDRESS_CONTEXT
        .try_with(|ctx| ctx.address.clone())
        .unwrap_or_default()
}

/// Query the interrupt state injected at the current address.
///
/// Returns `(was_interrupted, has_state, state)`. `was_interrupted` mirrors the raw
/// injection bit regardless of type match; `has_state` additionally requires the
/// stored value to deserialize as `T`. A present-but-wrong-shaped value yields
/// `(true, false, None)` rather than an error — diagnosing a type mismatch is the
/// caller's job, not a panic.
pub fn get_interrupt_state<T: DeserializeOwned>() -> (bool, bool, Option<T>) {
    ADDRESS_CONTEXT
        .try_with(|ctx| {
            let was_interrupted = ctx.has_interrupt_state;
            let typed = ctx
                .interrupt_state
                .as_ref()
                .and_then(|v| serde_json::from_value::<T>(v.clone()).ok());
            let has_state = typed.is_some();
            (was_interrupted, has_state, typed)
        })
        .unwrap_or((false, false, None))
}

/// Query the resume data injected at the current address.
///
/// Returns `(is_resume_target, has_data, data)`. `is_resume_target` is true whenever
/// this address (or a descendant's pending resume) was matched, even if no payload
/// was supplied. `has_data` additionally requires a non-null stored value that
/// deserializes as `T`.
pub fn get_resume_context<T: DeserializeOwned>() -> (bool, bool, Option<T>) {
    ADDRESS_CONTEXT
        .try_with(|ctx| {
            let is_resume_target = ctx.is_resume_target;
            let typed = ctx
                .resume_data
                .as_ref()
                .and_then(|v| serde_json::from_value::<T>(v.clone()).ok());
            let has_data = typed.is_some();
            (is_resume_target, has_data, typed)
        })
        .unwrap_or((false, false, None))
}

/// Compute the frame for appending `seg` to the current address, consulting the
/// ambient [`ResumeInfo`] (if one is installed) for injection.
fn push(seg: AddressSegment) -> AddressContext {
    let current = current_address();
    let new_address = current.append(seg);
    let mut ctx = AddressContext::for_address(new_address.clone());

    let _ = RESUME_INFO.try_with(|info| {
        info.inject(&new_address, &mut ctx);
    });

    tracing::trace!(
        address = %new_address.to_canonical_string(),
        is_resume_target = ctx.is_resume_target,
        has_interrupt_state = ctx.has_interrupt_state,
        has_resume_data = ctx.has_resume_data,
        "address segment pushed"
    );

    ctx
}

/// Run `fut` with `seg` appended to the ambient address.
///
/// This is the executor-facing entry point: wrap a child task's future with this at
/// every fan-out point (one node's execution, one tool call, one nested subgraph or
/// agent invocation) so address-scoped interrupt/resume bookkeeping stays correct
/// without the child needing to know its own position in the tree.
pub async fn with_address_segment<F: std::future::Future>(seg: AddressSegment, fut: F) -> F::Output {
    let ctx = push(seg);
    ADDRESS_CONTEXT.scope(ctx, fut).await
}

/// Install `info` as the ambient resume registry for the duration of `fut`.
///
/// Call this once, at the root of an execution, before any [`with_address_segment`]
/// calls happen underneath it.
pub async fn with_resume_info<F: std::future::Future>(info: Arc<ResumeInfo>, fut: F) -> F::Output {
    RESUME_INFO.scope(info, fut).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::resume::resume_with_data;
    use std::collections::HashMap;

    #[tokio::test]
    async fn current_address_defaults_to_root_outside_any_scope() {
        assert_eq!(current_address(), Address::root());
    }

    #[tokio::test]
    async fn nested_segments_accumulate_in_order() {
        with_address_segment(AddressSegment::node("outer"), async {
            assert_eq!(current_address().to_canonical_string(), "node:outer");
            with_address_segment(AddressSegment::subgraph("inner"), async {
                assert_eq!(current_address().to_canonical_string(), "node:outer;subgraph:inner");
            })
            .await;
            // Returning to the outer scope must not see the inner push.
            assert_eq!(current_address().to_canonical_string(), "node:outer");
        })
        .await;
    }

    #[tokio::test]
    async fn sibling_branches_do_not_observe_each_others_pushes() {
        let a = with_address_segment(AddressSegment::node("root"), async {
            with_address_segment(AddressSegment::tool("a", ""), async { current_address() }).await
        });
        let b = with_address_segment(AddressSegment::node("root"), async {
            with_address_segment(AddressSegment::tool("b", ""), async { current_address() }).await
        });
        let (a, b) = futures::future::join(a, b).await;
        assert_eq!(a.to_canonical_string(), "node:root;tool:a");
        assert_eq!(b.to_canonical_string(), "node:root;tool:b");
    }

    #[tokio::test]
    async fn resume_context_reports_type_mismatch_without_panicking() {
        let addr = Address::root().append(AddressSegment::node("n"));
        let mut addr_map = HashMap::new();
        addr_map.insert("int-1".to_string(), addr.clone());
        let info = Arc::new(ResumeInfo::populate(addr_map, HashMap::new()));
        resume_with_data(Some(info.clone()), "int-1", serde_json::json!("not a number"));

        with_resume_info(info, async {
            with_address_segment(AddressSegment::node("n"), async {
                let (is_target, has_data, data) = get_resume_context::<i64>();
                assert!(is_target);
                assert!(!has_data);
                assert_eq!(data, None);

                let (is_target2, has_data2, data2) = get_resume_context::<String>();
                assert!(is_target2);
                assert!(has_data2);
                assert_eq!(data2, Some("not a number".to_string()));
            })
            .await;
        })
        .await;
    }

    #[tokio::test]
    async fn one_shot_consumption_across_two_pushes_to_same_address() {
        let addr = Address::root().append(AddressSegment::node("n"));
        let mut addr_map = HashMap::new();
        addr_map.insert("int-1".to_string(), addr.clone());
        let mut state_map = HashMap::new();
        state_map.insert("int-1".to_string(), serde_json::json!({"k": 1}));
        let info = Arc::new(ResumeInfo::populate(addr_map, state_map));
        resume_with_data(Some(info.clone()), "int-1", serde_json::json!({"ok": true}));

        with_resume_info(info, async {
            with_address_segment(AddressSegment::node("n"), async {
                let (was_interrupted, has_state, _state) = get_interrupt_state::<Value>();
                let (is_target, has_data, _data) = get_resume_context::<Value>();
                assert!(was_interrupted && has_state);
                assert!(is_target && has_data);
            })
            .await;

            // Re-entering the same address a second time finds nothing left to consume.
            with_address_segment(AddressSegment::node("n"), async {
                let (was_interrupted, _has_state, _state) = get_interrupt_state::<Value>();
                let (_is_target, has_data, _data) = get_resume_context::<Value>();
                assert!(!was_interrupted);
                assert!(!has_data);
            })
            .await;
        })
        .await;
    }
}
