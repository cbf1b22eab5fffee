//! Shared mock keys for tests.
//!
//! Real analyses supply keys whose alias answers come from points-to or
//! value analysis; these mocks script the answers instead. `Slot` models
//! arbitrary aliasing for the list representation, `Path` models a prefix
//! hierarchy for the tree representation, and `TestCx` plays the
//! control-flow context with scriptable liveness.

use std::collections::BTreeSet;

use crate::object::AbstractObject;

/// Context token with scriptable liveness: keys are live unless killed.
#[derive(Debug, Default)]
pub struct TestCx {
    dead: BTreeSet<&'static str>,
}

impl TestCx {
    pub fn kill(&mut self, name: &'static str) {
        self.dead.insert(name);
    }

    pub fn is_dead(&self, name: &str) -> bool {
        self.dead.contains(name)
    }
}

/// Non-hierarchical key. `name` fixes the denoted set, `region` models
/// possible overlap, and `unique` marks one-element sets:
///
/// - equal-set: same `name`
/// - must-equal: same `name`, both `unique`
/// - may-equal: same `region`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub name: &'static str,
    pub region: u32,
    pub unique: bool,
}

impl Slot {
    /// A key denoting a one-element set.
    pub fn unique(name: &'static str, region: u32) -> Self {
        Slot {
            name,
            region,
            unique: true,
        }
    }

    /// A key denoting a multi-member set.
    pub fn shared(name: &'static str, region: u32) -> Self {
        Slot {
            name,
            region,
            unique: false,
        }
    }
}

impl AbstractObject for Slot {
    type Cx = TestCx;
    type Atom = u32;

    fn may_equal(&self, other: &Self, _cx: &TestCx) -> bool {
        self.region == other.region
    }

    fn must_equal(&self, other: &Self, _cx: &TestCx) -> bool {
        self.name == other.name && self.unique && other.unique
    }

    fn equal_set(&self, other: &Self, _cx: &TestCx) -> bool {
        self.name == other.name
    }

    fn is_live(&self, cx: &TestCx) -> bool {
        !cx.is_dead(self.name)
    }
}

/// Hierarchical key: `atoms` is the prefix-hierarchy path, `name` the
/// liveness handle, `unique` marks one-element sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub name: &'static str,
    pub atoms: Vec<u32>,
    pub unique: bool,
}

impl Path {
    pub fn unique(name: &'static str, atoms: Vec<u32>) -> Self {
        Path {
            name,
            atoms,
            unique: true,
        }
    }

    pub fn shared(name: &'static str, atoms: Vec<u32>) -> Self {
        Path {
            name,
            atoms,
            unique: false,
        }
    }
}

fn is_prefix(a: &[u32], b: &[u32]) -> bool {
    a.len() <= b.len() && a.iter().zip(b).all(|(x, y)| x == y)
}

impl AbstractObject for Path {
    type Cx = TestCx;
    type Atom = u32;

    fn may_equal(&self, other: &Self, _cx: &TestCx) -> bool {
        is_prefix(&self.atoms, &other.atoms) || is_prefix(&other.atoms, &self.atoms)
    }

    fn must_equal(&self, other: &Self, _cx: &TestCx) -> bool {
        self.atoms == other.atoms && self.unique && other.unique
    }

    fn equal_set(&self, other: &Self, _cx: &TestCx) -> bool {
        self.atoms == other.atoms
    }

    fn is_live(&self, cx: &TestCx) -> bool {
        !cx.is_dead(self.name)
    }

    fn is_hierarchy(&self) -> bool {
        true
    }

    fn hier_key(&self) -> &[u32] {
        &self.atoms
    }
}
