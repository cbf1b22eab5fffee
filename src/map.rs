//! The map facade: a lattice-valued container over abstract-object keys.
//!
//! The facade adds two degenerate whole-map states on top of the concrete
//! representations: `Full` (denotes every possible binding) and `Empty`
//! (denotes none), neither of which materializes a representation. A real
//! representation is selected lazily on the first insertion, from the
//! hierarchy capability of the first key ever inserted, and is fixed for
//! the map's lifetime.

use std::fmt;

use log::debug;

use crate::hier::HierMap;
use crate::lattice::Lattice;
use crate::list::ListMap;
use crate::object::AbstractObject;
use crate::remap::RemapRule;

/// Construction-time options.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapConfig {
    /// Use the list representation even for hierarchical keys. Useful for
    /// differential testing of the two representations.
    pub force_list: bool,
}

/// The two concrete representations. The choice is made once, at first
/// insertion, and never changes for the lifetime of the map.
#[derive(Debug, Clone)]
enum Repr<K: AbstractObject, L: Lattice> {
    List(ListMap<K, L>),
    Tree(HierMap<K, L>),
}

#[derive(Debug, Clone)]
enum MapState<K: AbstractObject, L: Lattice> {
    /// Denotes every possible binding; no representation is stored.
    Full,
    /// Denotes no bindings; no representation is stored.
    Empty,
    /// A specific set of bindings held by a representation.
    Between(Repr<K, L>),
}

/// A map from abstract objects to lattice values, sound under aliasing and
/// under merges of facts arriving from multiple control-flow paths.
///
/// Cloning a map is cheap: representations share their values (and tree
/// nodes) until one side mutates, at which point the mutating side clones
/// privately first. Snapshots taken per CFG edge therefore stay
/// independent.
#[derive(Debug, Clone)]
pub struct AbstractObjectMap<K: AbstractObject, L: Lattice> {
    state: MapState<K, L>,
    /// Copies of this value answer `get` for unmatched keys and stand in
    /// for the degenerate states.
    default: L,
    config: MapConfig,
}

impl<K: AbstractObject, L: Lattice> AbstractObjectMap<K, L> {
    /// A fresh map denoting no bindings. `default` is the value returned
    /// (cloned, lowered or raised as needed) where no binding applies.
    pub fn new(default: L) -> Self {
        Self::with_config(default, MapConfig::default())
    }

    pub fn with_config(default: L, config: MapConfig) -> Self {
        AbstractObjectMap {
            state: MapState::Empty,
            default,
            config,
        }
    }

    fn repr_for(&self, key: &K) -> Repr<K, L> {
        if key.is_hierarchy() && !self.config.force_list {
            debug!("selecting tree representation from first key {:?}", key);
            Repr::Tree(HierMap::new())
        } else {
            debug!("selecting list representation from first key {:?}", key);
            Repr::List(ListMap::new())
        }
    }

    /// Add a binding to the frontier. Returns `true` iff the map changed.
    ///
    /// A full map cannot be enlarged, so inserting into it is a no-op;
    /// inserting into an empty map materializes a representation.
    pub fn insert(&mut self, key: K, val: L, cx: &K::Cx) -> bool {
        if matches!(self.state, MapState::Full) {
            return false;
        }
        if matches!(self.state, MapState::Empty) {
            let repr = self.repr_for(&key);
            self.state = MapState::Between(repr);
        }
        let MapState::Between(repr) = &mut self.state else {
            unreachable!()
        };
        match repr {
            Repr::List(m) => {
                assert!(
                    !key.is_hierarchy() || self.config.force_list,
                    "hierarchical key handed to a list-backed map"
                );
                m.insert(key, val, cx)
            }
            Repr::Tree(m) => {
                assert!(
                    key.is_hierarchy(),
                    "non-hierarchical key handed to a tree-backed map"
                );
                m.insert(key, val, cx)
            }
        }
    }

    /// Erase the binding that must-equals `key`. A full map has nothing
    /// removable; an empty map has nothing to remove by construction.
    pub fn remove(&mut self, key: &K, cx: &K::Cx) -> bool {
        match &mut self.state {
            MapState::Full => false,
            MapState::Empty => panic!("remove from an empty map"),
            MapState::Between(Repr::List(m)) => m.remove(key, cx),
            MapState::Between(Repr::Tree(m)) => m.remove(key, cx),
        }
    }

    /// Everything known about `key`: a fresh full (resp. empty) value on a
    /// degenerate map, the representation's accumulated answer otherwise.
    pub fn get(&self, key: &K, cx: &K::Cx) -> L {
        match &self.state {
            MapState::Full => {
                let mut v = self.default.clone();
                v.set_to_full();
                v
            }
            MapState::Empty => {
                let mut v = self.default.clone();
                v.set_to_empty();
                v
            }
            MapState::Between(Repr::List(m)) => m.get(key, &self.default, cx),
            MapState::Between(Repr::Tree(m)) => m.get(key, &self.default, cx),
        }
    }

    /// Make the map denote every possible binding, discarding the
    /// representation. Returns `true` iff the state changed.
    pub fn set_to_full(&mut self) -> bool {
        let modified = !matches!(self.state, MapState::Full);
        self.state = MapState::Full;
        modified
    }

    /// Make the map denote no bindings, discarding the representation.
    /// Returns `true` iff the state changed.
    pub fn set_to_empty(&mut self) -> bool {
        let modified = !matches!(self.state, MapState::Empty);
        self.state = MapState::Empty;
        modified
    }

    /// Invalidate everything that may alias `probe`. On a degenerate map
    /// there is either nothing to raise or nothing bound.
    pub fn set_ml_value_to_full(&mut self, probe: &K, cx: &K::Cx) -> bool {
        match &mut self.state {
            MapState::Full | MapState::Empty => false,
            MapState::Between(Repr::List(m)) => m.set_ml_value_to_full(probe, cx),
            MapState::Between(Repr::Tree(m)) => m.set_ml_value_to_full(probe, &self.default, cx),
        }
    }

    pub fn is_full_lat(&mut self) -> bool {
        match &mut self.state {
            MapState::Full => true,
            MapState::Empty => false,
            MapState::Between(Repr::List(m)) => m.is_full_lat(),
            MapState::Between(Repr::Tree(m)) => m.is_full_lat(),
        }
    }

    pub fn is_empty_lat(&mut self, cx: &K::Cx) -> bool {
        match &mut self.state {
            MapState::Full => false,
            MapState::Empty => true,
            MapState::Between(Repr::List(m)) => m.is_empty_lat(cx),
            MapState::Between(Repr::Tree(m)) => m.is_empty_lat(),
        }
    }

    /// Whether every value in the map ranges over a finite-height domain.
    pub fn finite_lattice(&self) -> bool {
        match &self.state {
            MapState::Full | MapState::Empty => true,
            MapState::Between(Repr::List(m)) => m.finite_lattice(),
            MapState::Between(Repr::Tree(m)) => m.finite_lattice(),
        }
    }

    /// Merge-over-paths: fold `that` into `self`. Returns `true` iff
    /// `self` changed.
    ///
    /// Full absorbs everything; empty adopts the other side's
    /// representation, shared rather than cloned; two real representations
    /// merge structurally and must be of the same kind.
    pub fn meet_update(&mut self, that: &Self, cx: &K::Cx) -> bool {
        if matches!(self.state, MapState::Full) {
            return false;
        }
        if matches!(self.state, MapState::Empty) {
            return match &that.state {
                MapState::Full => self.set_to_full(),
                MapState::Empty => false,
                MapState::Between(repr) => {
                    self.state = MapState::Between(repr.clone());
                    true
                }
            };
        }
        match &that.state {
            MapState::Full => self.set_to_full(),
            MapState::Empty => false,
            MapState::Between(that_repr) => {
                let MapState::Between(repr) = &mut self.state else {
                    unreachable!()
                };
                match (repr, that_repr) {
                    (Repr::List(a), Repr::List(b)) => a.meet_update(b, cx),
                    (Repr::Tree(a), Repr::Tree(b)) => a.meet_update(b, cx),
                    _ => panic!("meet of maps with different representations"),
                }
            }
        }
    }

    /// Translate keys across a call/return boundary; always returns a
    /// freshly allocated map. Degenerate maps remap to copies of
    /// themselves.
    pub fn remap_ml(&self, rules: &[RemapRule<K>], from_cx: &K::Cx, cx: &K::Cx) -> Self {
        let state = match &self.state {
            MapState::Between(Repr::List(m)) => {
                MapState::Between(Repr::List(m.remap_ml(rules, &self.default, from_cx, cx)))
            }
            MapState::Between(Repr::Tree(m)) => {
                MapState::Between(Repr::Tree(m.remap_ml(rules, &self.default, from_cx, cx)))
            }
            degenerate => degenerate.clone(),
        };
        AbstractObjectMap {
            state,
            default: self.default.clone(),
            config: self.config,
        }
    }

    /// Overwrite the bindings described by `that` into `self`, keeping
    /// everything else. No-op on a degenerate map.
    pub fn replace_ml(&mut self, that: &Self, cx: &K::Cx) -> bool {
        match (&mut self.state, &that.state) {
            (MapState::Between(a), MapState::Between(b)) => match (a, b) {
                (Repr::List(x), Repr::List(y)) => x.replace_ml(y, cx),
                (Repr::Tree(x), Repr::Tree(y)) => x.replace_ml(y, cx),
                _ => panic!("replace across maps with different representations"),
            },
            _ => false,
        }
    }

    /// Overwrite this map's whole state with `that`'s. The representation
    /// is shared, not cloned.
    pub fn copy_from(&mut self, that: &Self) {
        self.state = that.state.clone();
    }

    /// Structural comparison. Degenerate states compare by state;
    /// representations compare structurally and must be of the same kind.
    pub fn equals(&self, that: &Self, cx: &K::Cx) -> bool {
        match (&self.state, &that.state) {
            (MapState::Full, MapState::Full) | (MapState::Empty, MapState::Empty) => true,
            (MapState::Between(a), MapState::Between(b)) => match (a, b) {
                (Repr::List(x), Repr::List(y)) => x.equals(y, cx),
                (Repr::Tree(x), Repr::Tree(y)) => x.equals(y, cx),
                _ => panic!("comparing maps with different representations"),
            },
            _ => false,
        }
    }
}

impl<K: AbstractObject, L: Lattice> fmt::Display for AbstractObjectMap<K, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            MapState::Full => write!(f, "[AbstractObjectMap: full]"),
            MapState::Empty => write!(f, "[AbstractObjectMap: empty]"),
            MapState::Between(Repr::List(m)) => write!(f, "{}", m),
            MapState::Between(Repr::Tree(m)) => write!(f, "{}", m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::SetLattice;
    use crate::fixtures::{Path, Slot, TestCx};

    type SlotMap = AbstractObjectMap<Slot, SetLattice<i64>>;
    type PathMap = AbstractObjectMap<Path, SetLattice<i64>>;

    fn set(elems: &[i64]) -> SetLattice<i64> {
        SetLattice::of(elems.iter().copied())
    }

    fn slot_map() -> SlotMap {
        AbstractObjectMap::new(SetLattice::empty())
    }

    fn path_map() -> PathMap {
        AbstractObjectMap::new(SetLattice::empty())
    }

    #[test]
    fn test_full_absorbs_meet() {
        let cx = TestCx::default();
        let mut full = slot_map();
        full.set_to_full();
        let mut other = slot_map();
        other.insert(Slot::unique("x", 1), set(&[1]), &cx);

        assert!(!full.meet_update(&other, &cx));
        assert!(full.is_full_lat());
    }

    #[test]
    fn test_empty_meet_full_becomes_full() {
        let cx = TestCx::default();
        let mut empty = slot_map();
        let mut full = slot_map();
        full.set_to_full();

        assert!(empty.meet_update(&full, &cx));
        assert!(empty.is_full_lat());
    }

    #[test]
    fn test_empty_meet_empty_stays_empty() {
        let cx = TestCx::default();
        let mut a = slot_map();
        let b = slot_map();
        assert!(!a.meet_update(&b, &cx));
        assert!(a.is_empty_lat(&cx));
    }

    #[test]
    fn test_empty_meet_between_adopts_representation() {
        let cx = TestCx::default();
        let x = Slot::unique("x", 1);
        let mut a = slot_map();
        let mut b = slot_map();
        b.insert(x.clone(), set(&[1]), &cx);

        assert!(a.meet_update(&b, &cx));
        assert_eq!(a.get(&x, &cx), set(&[1]));
        // the adopted representation is shared until written
        a.insert(x.clone(), set(&[2]), &cx);
        assert_eq!(b.get(&x, &cx), set(&[1]));
    }

    #[test]
    fn test_between_meet_full_becomes_full() {
        let cx = TestCx::default();
        let mut a = slot_map();
        a.insert(Slot::unique("x", 1), set(&[1]), &cx);
        let mut full = slot_map();
        full.set_to_full();

        assert!(a.meet_update(&full, &cx));
        assert!(a.is_full_lat());
    }

    #[test]
    fn test_insert_into_full_is_noop() {
        let cx = TestCx::default();
        let mut m = slot_map();
        m.set_to_full();
        let x = Slot::unique("x", 1);
        assert!(!m.insert(x.clone(), set(&[1]), &cx));
        assert!(m.get(&x, &cx).is_full());
    }

    #[test]
    fn test_get_on_degenerate_states() {
        let cx = TestCx::default();
        let x = Slot::unique("x", 1);
        let mut m = slot_map();
        assert!(m.get(&x, &cx).is_empty());
        m.set_to_full();
        assert!(m.get(&x, &cx).is_full());
    }

    #[test]
    fn test_remove_on_full_is_noop() {
        let cx = TestCx::default();
        let mut m = slot_map();
        m.set_to_full();
        assert!(!m.remove(&Slot::unique("x", 1), &cx));
    }

    #[test]
    #[should_panic(expected = "remove from an empty map")]
    fn test_remove_on_empty_panics() {
        let cx = TestCx::default();
        let mut m = slot_map();
        m.remove(&Slot::unique("x", 1), &cx);
    }

    #[test]
    fn test_set_to_full_reports_change_once() {
        let mut m = slot_map();
        assert!(m.set_to_full());
        assert!(!m.set_to_full());
        assert!(m.set_to_empty());
        assert!(!m.set_to_empty());
    }

    #[test]
    fn test_lazy_selection_picks_tree_for_hierarchies() {
        let cx = TestCx::default();
        let mut m = path_map();
        m.insert(Path::unique("x", vec![1]), set(&[1]), &cx);
        assert!(matches!(
            m.state,
            MapState::Between(Repr::Tree(_))
        ));
    }

    #[test]
    fn test_force_list_overrides_selection() {
        let cx = TestCx::default();
        let mut m = AbstractObjectMap::with_config(
            SetLattice::empty(),
            MapConfig { force_list: true },
        );
        m.insert(Path::unique("x", vec![1]), set(&[1]), &cx);
        assert!(matches!(
            m.state,
            MapState::Between(Repr::List(_))
        ));
    }

    #[test]
    fn test_representations_agree_on_lookups() {
        let cx = TestCx::default();
        let keys = [
            Path::unique("x", vec![1, 2]),
            Path::shared("arr", vec![3]),
            Path::shared("arr0", vec![3, 0]),
        ];
        let mut tree = path_map();
        let mut list = AbstractObjectMap::with_config(
            SetLattice::empty(),
            MapConfig { force_list: true },
        );
        for (i, k) in keys.iter().enumerate() {
            tree.insert(k.clone(), set(&[i as i64]), &cx);
            list.insert(k.clone(), set(&[i as i64]), &cx);
        }
        // a singleton unrelated to the others answers identically
        assert_eq!(tree.get(&keys[0], &cx), list.get(&keys[0], &cx));
    }

    #[test]
    #[should_panic(expected = "different representations")]
    fn test_mixed_representation_meet_panics() {
        let cx = TestCx::default();
        let key = Path::unique("x", vec![1]);
        let mut forced = AbstractObjectMap::with_config(
            SetLattice::empty(),
            MapConfig { force_list: true },
        );
        forced.insert(key.clone(), set(&[1]), &cx);
        let mut tree = path_map();
        tree.insert(key.clone(), set(&[2]), &cx);
        forced.meet_update(&tree, &cx);
    }

    #[test]
    fn test_copy_on_write_isolation() {
        let cx = TestCx::default();
        let r = Slot::shared("r", 3);
        let mut ancestor = slot_map();
        ancestor.insert(r.clone(), set(&[1]), &cx);

        let mut left = ancestor.clone();
        let mut right = ancestor.clone();
        // equal-set inserts meld in place, through the shared value
        left.insert(r.clone(), set(&[2]), &cx);
        right.insert(r.clone(), set(&[3]), &cx);

        assert_eq!(ancestor.get(&r, &cx), set(&[1]));
        assert_eq!(left.get(&r, &cx), set(&[1, 2]));
        assert_eq!(right.get(&r, &cx), set(&[1, 3]));
    }

    #[test]
    fn test_dead_key_pruning() {
        let mut cx = TestCx::default();
        let x = Slot::unique("x", 1);
        let probe = Slot::unique("p", 1); // overlaps x's region
        let mut m = slot_map();
        m.insert(x.clone(), set(&[1]), &cx);
        assert_eq!(m.get(&probe, &cx), set(&[1]));

        cx.kill("x");
        assert!(m.is_empty_lat(&cx));
        assert!(m.get(&probe, &cx).is_empty());
    }

    #[test]
    fn test_remap_on_degenerate_is_a_copy() {
        let cx = TestCx::default();
        let mut m = slot_map();
        m.set_to_full();
        let rules = [RemapRule::rename(
            Slot::unique("a", 1),
            Slot::unique("b", 2),
        )];
        let mut remapped = m.remap_ml(&rules, &cx, &cx);
        assert!(remapped.is_full_lat());
        assert!(m.equals(&remapped, &cx));
    }

    #[test]
    fn test_remap_returns_fresh_map() {
        let cx = TestCx::default();
        let arg = Slot::unique("arg", 1);
        let param = Slot::unique("param", 2);
        let mut m = slot_map();
        m.insert(arg.clone(), set(&[1]), &cx);

        let rules = [RemapRule::rename(arg.clone(), param.clone())];
        let remapped = m.remap_ml(&rules, &cx, &cx);
        assert_eq!(remapped.get(&param, &cx), set(&[1]));
        assert_eq!(m.get(&arg, &cx), set(&[1]));
    }

    #[test]
    fn test_replace_ml_on_degenerate_is_noop() {
        let cx = TestCx::default();
        let mut m = slot_map();
        m.set_to_full();
        let mut other = slot_map();
        other.insert(Slot::unique("x", 1), set(&[1]), &cx);
        assert!(!m.replace_ml(&other, &cx));
        assert!(m.is_full_lat());
    }

    #[test]
    fn test_replace_ml_overwrites_bindings() {
        let cx = TestCx::default();
        let x = Slot::unique("x", 1);
        let mut m = slot_map();
        m.insert(x.clone(), set(&[1]), &cx);
        let mut newer = slot_map();
        newer.insert(x.clone(), set(&[2]), &cx);

        assert!(m.replace_ml(&newer, &cx));
        assert_eq!(m.get(&x, &cx), set(&[2]));
    }

    #[test]
    fn test_equals_degenerate_states() {
        let cx = TestCx::default();
        let mut a = slot_map();
        let mut b = slot_map();
        assert!(a.equals(&b, &cx));
        a.set_to_full();
        assert!(!a.equals(&b, &cx));
        b.set_to_full();
        assert!(a.equals(&b, &cx));
    }

    #[test]
    fn test_copy_from_shares_state() {
        let cx = TestCx::default();
        let x = Slot::unique("x", 1);
        let mut src = slot_map();
        src.insert(x.clone(), set(&[1]), &cx);
        let mut dst = slot_map();
        dst.copy_from(&src);
        assert!(dst.equals(&src, &cx));
        // divergence after the copy stays private
        dst.insert(x.clone(), set(&[2]), &cx);
        assert_eq!(src.get(&x, &cx), set(&[1]));
    }

    #[test_log::test]
    fn test_finite_lattice_on_degenerate_states() {
        let cx = TestCx::default();
        let mut m = slot_map();
        assert!(m.finite_lattice());
        m.insert(Slot::unique("x", 1), set(&[1]), &cx);
        assert!(m.finite_lattice());
        m.set_to_full();
        assert!(m.finite_lattice());
    }

    #[test_log::test]
    fn test_display_names_degenerate_states() {
        let mut m = slot_map();
        assert_eq!(m.to_string(), "[AbstractObjectMap: empty]");
        m.set_to_full();
        assert_eq!(m.to_string(), "[AbstractObjectMap: full]");
    }
}
