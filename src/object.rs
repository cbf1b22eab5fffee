//! The abstract-object contract: symbolic handles for sets of concrete
//! memory locations or runtime values.
//!
//! Alias and liveness queries are answered relative to a *context*: an
//! opaque token identifying a location or edge in the control-flow graph.
//! The map threads the context through unexamined.

use std::fmt::Debug;

/// A symbolic handle denoting a (possibly singleton, possibly unbounded)
/// set of concrete objects.
///
/// # Alias predicates
///
/// - [`may_equal`](Self::may_equal): the denoted sets can overlap.
/// - [`must_equal`](Self::must_equal): the sets are equal *and* have exactly
///   one concrete member.
/// - [`equal_set`](Self::equal_set): the sets are provably identical in
///   membership, but may contain different concrete members across
///   executions.
///
/// `must_equal` implies `equal_set` implies `may_equal`.
///
/// # Hierarchical keys
///
/// When [`is_hierarchy`](Self::is_hierarchy) returns `true`,
/// [`hier_key`](Self::hier_key) yields an ordered sequence of atoms with the
/// semantics: if key A's sequence is a prefix of key B's, the set A denotes
/// is a superset of the set B denotes; otherwise the sets are disjoint.
/// Every key handed to one map instance must report the same
/// `is_hierarchy` answer; the map asserts this but does not otherwise
/// check it.
pub trait AbstractObject: Clone + Debug {
    /// Opaque control-flow context the alias and liveness queries apply at.
    type Cx: ?Sized;

    /// Sub-key atom for hierarchical keys. Unused when `is_hierarchy` is
    /// `false`.
    type Atom: Ord + Clone + Debug;

    /// Can the denoted sets overlap at `cx`?
    fn may_equal(&self, other: &Self, cx: &Self::Cx) -> bool;

    /// Are the denoted sets equal singletons at `cx`?
    fn must_equal(&self, other: &Self, cx: &Self::Cx) -> bool;

    /// Do the two keys denote provably identical sets at `cx`?
    fn equal_set(&self, other: &Self, cx: &Self::Cx) -> bool;

    /// Is the denoted object in scope at `cx`?
    fn is_live(&self, cx: &Self::Cx) -> bool;

    /// Whether this key decomposes into a prefix hierarchy of atoms.
    fn is_hierarchy(&self) -> bool {
        false
    }

    /// The ordered atom sequence for hierarchical keys. An empty sequence
    /// denotes the set of everything.
    fn hier_key(&self) -> &[Self::Atom] {
        &[]
    }

    /// Whether the denoted set has exactly one concrete member.
    fn is_singleton(&self, cx: &Self::Cx) -> bool {
        self.must_equal(self, cx)
    }
}
