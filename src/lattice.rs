//! The dataflow-value contract consumed by the map.
//!
//! The map never looks inside a lattice value; it only clones, joins, and
//! probes it through this trait. The analysis that owns the map decides
//! what the values mean (sets of constants, points-to sets, ...).

use std::fmt::Debug;

/// A dataflow fact with a destructive join.
///
/// Following the surrounding analysis framework's naming, the join is called
/// *meet*: `meet_update` folds `other` into `self` in place and reports
/// whether `self` changed. `Clone` stands in for `clone()`, and `PartialEq`
/// for value equivalence.
///
/// # Laws
///
/// - `a.meet_update(&a)` returns `false` (idempotence)
/// - meeting is commutative and associative up to `==`
/// - a full value absorbs every meet; an empty value is the identity
pub trait Lattice: Clone + Debug + PartialEq {
    /// Fold `other` into `self`. Returns `true` iff `self` changed.
    fn meet_update(&mut self, other: &Self) -> bool;

    /// Does this value denote everything the domain can express?
    fn is_full(&self) -> bool;

    /// Does this value carry no information at all?
    fn is_empty(&self) -> bool;

    /// Raise this value to full. Returns `true` iff it changed.
    fn set_to_full(&mut self) -> bool;

    /// Lower this value to empty. Returns `true` iff it changed.
    fn set_to_empty(&mut self) -> bool;

    /// Whether the value ranges over a finite-height domain, so fixpoint
    /// iteration over it terminates without widening.
    fn is_finite(&self) -> bool {
        true
    }
}
