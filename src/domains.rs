//! Ready-made lattice instances.
//!
//! The map is generic over any [`Lattice`]; these two cover the common
//! shapes (a finite-set domain for may-analyses, a flat domain for
//! constant propagation) and double as the value types used throughout
//! the crate's own tests.

use std::collections::BTreeSet;
use std::fmt::Debug;

use crate::lattice::Lattice;

/// Finite-set lattice: meet is set union, with an explicit absorbing `Full`
/// element standing for "any value".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetLattice<T: Ord + Clone + Debug> {
    Full,
    Elems(BTreeSet<T>),
}

impl<T: Ord + Clone + Debug> SetLattice<T> {
    /// The empty set (bottom).
    pub fn empty() -> Self {
        SetLattice::Elems(BTreeSet::new())
    }

    /// A set holding the given elements.
    pub fn of<I: IntoIterator<Item = T>>(items: I) -> Self {
        SetLattice::Elems(items.into_iter().collect())
    }

    pub fn contains(&self, item: &T) -> bool {
        match self {
            SetLattice::Full => true,
            SetLattice::Elems(s) => s.contains(item),
        }
    }
}

impl<T: Ord + Clone + Debug> Lattice for SetLattice<T> {
    fn meet_update(&mut self, other: &Self) -> bool {
        match other {
            SetLattice::Full => self.set_to_full(),
            SetLattice::Elems(theirs) => match self {
                SetLattice::Full => false,
                SetLattice::Elems(ours) => {
                    let before = ours.len();
                    ours.extend(theirs.iter().cloned());
                    ours.len() != before
                }
            },
        }
    }

    fn is_full(&self) -> bool {
        matches!(self, SetLattice::Full)
    }

    fn is_empty(&self) -> bool {
        matches!(self, SetLattice::Elems(s) if s.is_empty())
    }

    fn set_to_full(&mut self) -> bool {
        if self.is_full() {
            false
        } else {
            *self = SetLattice::Full;
            true
        }
    }

    fn set_to_empty(&mut self) -> bool {
        if self.is_empty() {
            false
        } else {
            *self = SetLattice::empty();
            true
        }
    }
}

/// Flat lattice for constant propagation: bottom, a single known value, or
/// top ("any value").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlatLattice<T: Eq + Clone + Debug> {
    Bottom,
    Known(T),
    Top,
}

impl<T: Eq + Clone + Debug> Lattice for FlatLattice<T> {
    fn meet_update(&mut self, other: &Self) -> bool {
        match (&*self, other) {
            (_, FlatLattice::Bottom) => false,
            (FlatLattice::Top, _) => false,
            (FlatLattice::Bottom, v) => {
                *self = v.clone();
                true
            }
            (FlatLattice::Known(a), FlatLattice::Known(b)) if a == b => false,
            _ => {
                *self = FlatLattice::Top;
                true
            }
        }
    }

    fn is_full(&self) -> bool {
        matches!(self, FlatLattice::Top)
    }

    fn is_empty(&self) -> bool {
        matches!(self, FlatLattice::Bottom)
    }

    fn set_to_full(&mut self) -> bool {
        if self.is_full() {
            false
        } else {
            *self = FlatLattice::Top;
            true
        }
    }

    fn set_to_empty(&mut self) -> bool {
        if self.is_empty() {
            false
        } else {
            *self = FlatLattice::Bottom;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_union() {
        let mut a = SetLattice::of([1, 2]);
        assert!(a.meet_update(&SetLattice::of([2, 3])));
        assert_eq!(a, SetLattice::of([1, 2, 3]));
        assert!(!a.meet_update(&SetLattice::of([1])));
    }

    #[test]
    fn test_set_full_absorbs() {
        let mut a = SetLattice::of([1]);
        assert!(a.meet_update(&SetLattice::Full));
        assert!(a.is_full());
        assert!(!a.meet_update(&SetLattice::of([7])));
        assert!(a.contains(&7));
    }

    #[test]
    fn test_set_empty_identity() {
        let mut a = SetLattice::of([4]);
        assert!(!a.meet_update(&SetLattice::empty()));
        assert_eq!(a, SetLattice::of([4]));
        assert!(SetLattice::<i64>::empty().is_empty());
    }

    #[test]
    fn test_flat_meet_table() {
        let mut a = FlatLattice::Bottom;
        assert!(a.meet_update(&FlatLattice::Known(5)));
        assert_eq!(a, FlatLattice::Known(5));

        assert!(!a.meet_update(&FlatLattice::Known(5)));
        assert!(a.meet_update(&FlatLattice::Known(6)));
        assert_eq!(a, FlatLattice::Top);

        assert!(!a.meet_update(&FlatLattice::Known(5)));
        assert!(a.is_full());
    }

    #[test]
    fn test_flat_set_ops() {
        let mut a = FlatLattice::Known(1);
        assert!(a.set_to_full());
        assert!(!a.set_to_full());
        assert!(a.set_to_empty());
        assert!(a.is_empty());
    }
}
