//! Hierarchical interrupt and resume support for graph execution.
//!
//! An interrupt is represented as a [`tree::Signal`] — an error value carrying an
//! [`address::Address`] naming where in the execution tree it originated, optional
//! component state, and (for a composite) child signals aggregated from a fan-out
//! point. [`context`] threads the ambient address and injected resume state through
//! execution via a scoped task-local, [`resume`] is the per-execution registry a
//! resume call populates and consumes from, and [`persistence`] flattens a tree to
//! and from the shape a checkpoint store can hold.
//!
//! Typical node code:
//!
//! ```ignore
//! let (was_interrupted, has_approval, approval) = signal::get_resume_context::<bool>();
//! if !was_interrupted {
//!     return Err(signal::simple_signal(json!("approve this action?")));
//! }
//! ```

pub mod address;
pub mod context;
pub mod persistence;
pub mod resume;
pub mod tree;

pub use address::{Address, AddressSegment, SegmentType};
pub use context::{current_address, get_interrupt_state, get_resume_context, with_address_segment, with_resume_info};
pub use persistence::{populate_resume_info, signal_to_persistence_maps, to_interrupt_contexts, InterruptContext};
pub use resume::{batch_resume_with_data, resume, resume_with_data, ResumeInfo};
pub use tree::{composite_signal, is_interrupt_signal, simple_signal, stateful_signal, Signal, SignalId};
