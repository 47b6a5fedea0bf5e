//! Hierarchical addresses identifying an interrupt site
//!
//! An [`Address`] names a position in the execution tree (node, subgraph, tool,
//! agent, ...) as a root-first sequence of [`AddressSegment`]s. Addresses are pure,
//! immutable values: [`Address::append`] always allocates a fresh sequence so that
//! parallel branches sharing a common prefix never observe each other's pushes.
//!
//! See [`crate::signal`] for how addresses fit into the rest of the interrupt/resume
//! subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of components an [`AddressSegment`] can identify.
///
/// Adding a variant here is an intentional, breaking extension of the address
/// algebra, not a routine change — every site that matches on `SegmentType`
/// (filters in [`super::persistence::to_interrupt_contexts`], for instance) would
/// need to decide how to treat the new kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentType {
    /// A graph node.
    Node,
    /// A tool invocation.
    Tool,
    /// A nested subgraph.
    Subgraph,
    /// A nested agent.
    Agent,
}

impl SegmentType {
    fn as_str(&self) -> &'static str {
        match self {
            SegmentType::Node => "node",
            SegmentType::Tool => "tool",
            SegmentType::Subgraph => "subgraph",
            SegmentType::Agent => "agent",
        }
    }
}

impl fmt::Display for SegmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One level of the execution hierarchy: `(Type, ID, SubID)`.
///
/// `sub_id` disambiguates sibling instances of the same component — parallel
/// invocations of the same tool, for example — and is empty when there is only
/// ever one instance at this position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressSegment {
    kind: SegmentType,
    id: String,
    sub_id: String,
}

impl AddressSegment {
    /// Build a segment with no sub-ID.
    pub fn new(kind: SegmentType, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            sub_id: String::new(),
        }
    }

    /// Build a segment disambiguated by `sub_id` (e.g. a parallel tool call ID).
    pub fn with_sub_id(kind: SegmentType, id: impl Into<String>, sub_id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            sub_id: sub_id.into(),
        }
    }

    /// Convenience constructor for a node segment.
    pub fn node(id: impl Into<String>) -> Self {
        Self::new(SegmentType::Node, id)
    }

    /// Convenience constructor for a tool segment, optionally disambiguated by call ID.
    pub fn tool(id: impl Into<String>, call_id: impl Into<String>) -> Self {
        let call_id = call_id.into();
        if call_id.is_empty() {
            Self::new(SegmentType::Tool, id)
        } else {
            Self::with_sub_id(SegmentType::Tool, id, call_id)
        }
    }

    /// Convenience constructor for a subgraph segment.
    pub fn subgraph(id: impl Into<String>) -> Self {
        Self::new(SegmentType::Subgraph, id)
    }

    /// Convenience constructor for an agent segment.
    pub fn agent(id: impl Into<String>) -> Self {
        Self::new(SegmentType::Agent, id)
    }

    /// The segment's kind.
    pub fn kind(&self) -> SegmentType {
        self.kind
    }

    /// The segment's primary identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The segment's sub-identifier, empty if none.
    pub fn sub_id(&self) -> &str {
        &self.sub_id
    }
}

impl fmt::Display for AddressSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sub_id.is_empty() {
            write!(f, "{}:{}", self.kind, self.id)
        } else {
            write!(f, "{}:{}:{}", self.kind, self.id, self.sub_id)
        }
    }
}

/// An ordered, root-first sequence of [`AddressSegment`]s naming an execution site.
///
/// The empty address is valid and names the execution root. Equality and descendant
/// checks are always structural (componentwise), never based on the canonical string
/// form, which is not injective when an ID embeds `;` or `:`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Address(Vec<AddressSegment>);

impl Address {
    /// The empty, root address.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build an address directly from its segments.
    pub fn from_segments(segments: Vec<AddressSegment>) -> Self {
        Self(segments)
    }

    /// The address's segments, root-first.
    pub fn segments(&self) -> &[AddressSegment] {
        &self.0
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the empty (root) address.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The last segment, if any.
    pub fn last(&self) -> Option<&AddressSegment> {
        self.0.last()
    }

    /// Return a *new* address with `segment` appended. `self` is left untouched —
    /// this is what lets a fan-out point build several children from one parent
    /// address without any child observing the others' pushes.
    pub fn append(&self, segment: AddressSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    /// Strict proper-prefix descendant test: `self` is a descendant of `ancestor`
    /// iff `ancestor` is shorter than `self` and equals `self`'s prefix of that
    /// length. An address is never a descendant of itself.
    pub fn is_descendant_of(&self, ancestor: &Address) -> bool {
        ancestor.0.len() < self.0.len() && self.0[..ancestor.0.len()] == ancestor.0[..]
    }

    /// Canonical string form: segments joined by `;`. Not guaranteed injective if an
    /// ID contains `;` or `:` — use structural equality for comparisons.
    pub fn to_canonical_string(&self) -> String {
        self.0
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(id: &str) -> AddressSegment {
        AddressSegment::node(id)
    }

    #[test]
    fn append_does_not_mutate_original() {
        let a = Address::root().append(seg("a"));
        let before_len = a.len();
        let before = a.clone();

        let _b = a.append(seg("b"));

        assert_eq!(a.len(), before_len);
        assert_eq!(a, before);
    }

    #[test]
    fn empty_address_is_valid_root() {
        let a = Address::root();
        assert!(a.is_empty());
        assert_eq!(a.to_canonical_string(), "");
    }

    #[test]
    fn descendant_is_strict() {
        let a = Address::root().append(seg("a"));
        assert!(!a.is_descendant_of(&a));

        let b = a.append(seg("b"));
        assert!(b.is_descendant_of(&a));
        assert!(!a.is_descendant_of(&b));
    }

    #[test]
    fn equals_is_componentwise() {
        let a = Address::root().append(seg("a")).append(seg("b"));
        let b = Address::root().append(seg("a")).append(seg("b"));
        assert_eq!(a, b);

        let c = Address::root().append(seg("a")).append(seg("c"));
        assert_ne!(a, c);
    }

    #[test]
    fn canonical_string_form() {
        let a = Address::from_segments(vec![
            AddressSegment::node("review"),
        ]);
        assert_eq!(a.to_canonical_string(), "node:review");

        let b = Address::from_segments(vec![
            AddressSegment::node("a"),
            AddressSegment::subgraph("b"),
            AddressSegment::node("c"),
        ]);
        assert_eq!(b.to_canonical_string(), "node:a;subgraph:b;node:c");

        let c = Address::from_segments(vec![AddressSegment::tool("search", "call1")]);
        assert_eq!(c.to_canonical_string(), "tool:search:call1");
    }

    #[test]
    fn sibling_addresses_share_prefix_and_differ_at_tail() {
        let root = Address::root().append(seg("step1"));
        let t1 = root.append(AddressSegment::tool("t1", ""));
        let t2 = root.append(AddressSegment::tool("t2", ""));

        assert_ne!(t1, t2);
        assert_eq!(t1.segments()[..1], t2.segments()[..1]);
        assert_eq!(root.to_canonical_string(), "node:step1");
    }
}
