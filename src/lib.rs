//! # aom-rs: Alias-Aware Abstract Object Maps
//!
//! **`aom-rs`** is a lattice-valued associative container for dataflow analysis.
//! It maps *abstract objects* --- symbolic handles denoting possibly-overlapping sets of
//! memory locations or runtime values --- to dataflow facts, and keeps may/must/equal-set
//! alias queries sound while facts merge across control-flow paths.
//!
//! ## What is an abstract object map?
//!
//! A dataflow analysis tracks one fact per storage location, but static analyses rarely
//! know exactly which location a name refers to: a pointer may alias several variables,
//! an array cell may stand for a whole region. An abstract object map stores bindings
//! keyed by such imprecise handles and answers queries by *accumulating* every binding
//! that may overlap the query key, stopping at a binding that definitely is the key.
//!
//! ## Key Features
//!
//! - **Two representations behind one facade**: a general ordered-list form correct for
//!   any aliasing relation, and a tree form exploiting keys that decompose into a prefix
//!   hierarchy. The facade picks one at the first insertion and sticks with it.
//! - **Degenerate whole-map states**: maps denoting *everything* or *nothing* are plain
//!   tags and never allocate a representation.
//! - **Cheap snapshots**: cloning a map shares values (and tree nodes) until one side
//!   writes; every mutating path clones privately first. One snapshot per CFG edge stays
//!   affordable during fixpoint iteration.
//! - **Cross-scope renaming**: [`remap_ml`][crate::map::AbstractObjectMap::remap_ml]
//!   translates keys across call/return boundaries from a set of rename/drop rules.
//!
//! ## Basic Usage
//!
//! ```rust
//! use aom_rs::domains::SetLattice;
//! use aom_rs::map::AbstractObjectMap;
//! use aom_rs::object::AbstractObject;
//!
//! // One named cell per variable: every distinct name is its own singleton set.
//! #[derive(Debug, Clone, PartialEq)]
//! struct Var(&'static str);
//!
//! impl AbstractObject for Var {
//!     type Cx = ();
//!     type Atom = u32;
//!     fn may_equal(&self, other: &Self, _: &()) -> bool { self.0 == other.0 }
//!     fn must_equal(&self, other: &Self, _: &()) -> bool { self.0 == other.0 }
//!     fn equal_set(&self, other: &Self, _: &()) -> bool { self.0 == other.0 }
//!     fn is_live(&self, _: &()) -> bool { true }
//! }
//!
//! let mut facts = AbstractObjectMap::new(SetLattice::<i64>::empty());
//! facts.insert(Var("x"), SetLattice::of([1]), &());
//! facts.insert(Var("y"), SetLattice::of([2, 3]), &());
//! assert_eq!(facts.get(&Var("x"), &()), SetLattice::of([1]));
//!
//! // merging the facts of another control-flow path accumulates
//! let mut other = facts.clone();
//! other.insert(Var("x"), SetLattice::of([4]), &());
//! facts.meet_update(&other, &());
//! assert_eq!(facts.get(&Var("x"), &()), SetLattice::of([1, 4]));
//! ```
//!
//! ## Core Components
//!
//! - **[`map`]**: the facade [`AbstractObjectMap`][crate::map::AbstractObjectMap] with
//!   its degenerate states and representation selection.
//! - **[`list`]**: the general representation; front of the list is the most recent
//!   write.
//! - **[`hier`]** and **[`node`]**: the tree representation for hierarchical keys.
//! - **[`object`]** and **[`lattice`]**: the capability traits supplied by the
//!   surrounding analysis.
//! - **[`domains`]**: ready-made set and flat lattices.

pub mod debug;
pub mod domains;
pub mod hier;
pub mod lattice;
pub mod list;
pub mod map;
pub mod node;
pub mod object;
pub mod remap;

#[cfg(test)]
pub(crate) mod fixtures;
