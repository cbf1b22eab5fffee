//! The hierarchical map representation: a tree keyed by key atoms.
//!
//! Applicable only to keys whose atom sequence forms a prefix hierarchy:
//! a key whose sequence is a prefix of another's denotes a superset of it,
//! and keys with diverging sequences denote disjoint sets. That structure
//! lets the tree answer alias queries by walking paths instead of scanning
//! every binding.

use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::debug::write_node;
use crate::lattice::Lattice;
use crate::node::Node;
use crate::object::AbstractObject;
use crate::remap::RemapRule;

/// Tree-backed map over hierarchical keys.
#[derive(Debug, Clone)]
pub struct HierMap<K: AbstractObject, L: Lattice> {
    root: Node<K, L>,
    finite: bool,
}

impl<K: AbstractObject, L: Lattice> Default for HierMap<K, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: AbstractObject, L: Lattice> HierMap<K, L> {
    pub fn new() -> Self {
        HierMap {
            root: Node::root(),
            finite: true,
        }
    }

    /// Add a binding at the key's atom path. Returns `true` iff the map
    /// changed.
    ///
    /// At the terminal node a singleton binding overwrites outright (the
    /// new state is fully determined, as with a must-equal overwrite);
    /// a non-singleton binding accumulates by meet, because across
    /// executions the key may denote different concrete objects.
    pub fn insert(&mut self, key: K, val: L, cx: &K::Cx) -> bool {
        debug_assert!(key.is_hierarchy());
        if !key.is_live(cx) {
            debug!("insert: dropping dead key {:?}", key);
            return false;
        }
        self.finite = self.finite && val.is_finite();
        // an empty value carries no information content
        if val.is_empty() {
            return false;
        }
        let singleton = key.is_singleton(cx);
        let atoms = key.hier_key().to_vec();
        Self::insert_at(&mut self.root, true, &atoms, key, singleton, Rc::new(val))
    }

    fn insert_at(
        node: &mut Node<K, L>,
        is_root: bool,
        atoms: &[K::Atom],
        key: K,
        singleton: bool,
        val: Rc<L>,
    ) -> bool {
        match atoms.split_first() {
            None => {
                if is_root {
                    // an empty key denotes everything; it binds at the root
                    node.key = Some(key);
                    node.val = Some(val);
                    true
                } else {
                    assert_eq!(
                        node.singleton, singleton,
                        "singleton shape changed for an existing key"
                    );
                    if node.singleton {
                        assert!(node.children.is_empty(), "singleton node with children");
                        node.key = Some(key);
                        node.val = Some(val);
                        true
                    } else {
                        if node.key.is_none() {
                            node.key = Some(key);
                        }
                        match &mut node.val {
                            Some(v) => Rc::make_mut(v).meet_update(&val),
                            None => {
                                node.val = Some(val);
                                true
                            }
                        }
                    }
                }
            }
            Some((first, rest)) => {
                if let Some(child) = node.children.get_mut(first) {
                    Self::insert_at(Rc::make_mut(child), false, rest, key, singleton, val)
                } else {
                    node.children.insert(
                        first.clone(),
                        Rc::new(Node::chain(first.clone(), rest, key, singleton, val)),
                    );
                    true
                }
            }
        }
    }

    /// Detach the binding for `key`, which only a singleton node permits:
    /// anything else could still denote other concrete objects.
    pub fn remove(&mut self, key: &K, _cx: &K::Cx) -> bool {
        debug_assert!(key.is_hierarchy());
        let atoms = key.hier_key();
        let Some((last, prefix)) = atoms.split_last() else {
            // the root is never detached
            return false;
        };

        // verify before touching anything: only a singleton leaf may go
        let mut node = &self.root;
        for atom in prefix {
            match node.children.get(atom) {
                Some(child) => node = child,
                None => return false,
            }
        }
        match node.children.get(last) {
            Some(child) if child.singleton => {}
            _ => return false,
        }

        // detach along a privately-owned path
        let mut node = &mut self.root;
        for atom in prefix {
            let child = node.children.get_mut(atom).unwrap(); // walked above
            node = Rc::make_mut(child);
        }
        node.children.remove(last);
        true
    }

    /// Accumulate everything known about `key`: every ancestor on the atom
    /// path denotes a superset, so its value applies; the subtree below the
    /// key's own node denotes subsets, so it is folded in wholesale. If the
    /// path runs out early, the accumulated prefix information is the
    /// answer.
    pub fn get(&self, key: &K, default: &L, _cx: &K::Cx) -> L {
        debug_assert!(key.is_hierarchy());
        let mut acc = default.clone();
        acc.set_to_empty();

        let atoms = key.hier_key();
        let mut node = &self.root;
        let mut idx = 0;
        loop {
            if idx == atoms.len() {
                node.meet_all_into(&mut acc);
                return acc;
            }
            if let Some(v) = &node.val {
                acc.meet_update(v);
            }
            match node.children.get(&atoms[idx]) {
                Some(child) => {
                    node = child;
                    idx += 1;
                }
                None => return acc,
            }
        }
    }

    /// Invalidate everything that may alias `probe`: values along the
    /// probe's path go full, and the subtree at the probe's own node is
    /// raised to full and truncated.
    pub fn set_ml_value_to_full(&mut self, probe: &K, default: &L, _cx: &K::Cx) -> bool {
        debug_assert!(probe.is_hierarchy());
        Self::set_full_at(&mut self.root, probe.hier_key(), default)
    }

    fn set_full_at(node: &mut Node<K, L>, atoms: &[K::Atom], default: &L) -> bool {
        match atoms.split_first() {
            None => node.set_subtree_to_full(default),
            Some((first, rest)) => {
                let mut modified = node.set_val_to_full();
                if let Some(child) = node.children.get_mut(first) {
                    modified |= Self::set_full_at(Rc::make_mut(child), rest, default);
                }
                modified
            }
        }
    }

    /// Whether the map covers every possible binding, which the tree can
    /// only conclude from a full value at its root. A full root makes the
    /// subtree redundant, so it is dropped.
    pub fn is_full_lat(&mut self) -> bool {
        if let Some(v) = &self.root.val {
            if v.is_full() {
                self.root.children.clear();
                return true;
            }
        }
        false
    }

    pub fn is_empty_lat(&self) -> bool {
        self.root.val.is_none() && self.root.children.is_empty()
    }

    /// Merge-over-paths: recursively meld `that`'s tree into `self`.
    /// Aligned nodes must agree on singleton shape; subtrees present only
    /// in `that` are adopted after pruning keys dead at `cx`.
    pub fn meet_update(&mut self, that: &HierMap<K, L>, cx: &K::Cx) -> bool {
        let mut modified = false;
        let finite = self.finite && that.finite;
        modified |= finite != self.finite;
        self.finite = finite;
        modified |= Self::meet_at(&mut self.root, &that.root, cx);
        modified
    }

    fn meet_at(this: &mut Node<K, L>, that: &Node<K, L>, cx: &K::Cx) -> bool {
        assert_eq!(
            this.singleton, that.singleton,
            "merging trees with mismatched singleton shape"
        );
        let mut modified = false;

        if let Some(w) = &that.val {
            if let Some(v) = &mut this.val {
                modified |= Rc::make_mut(v).meet_update(w);
            } else {
                modified |= !w.is_empty();
                this.val = Some(Rc::clone(w));
            }
        }

        for (atom, that_child) in &that.children {
            if let Some(this_child) = this.children.get_mut(atom) {
                modified |= Self::meet_at(Rc::make_mut(this_child), that_child, cx);
            } else if let Some(copied) = that_child.clone_live(cx) {
                this.children.insert(atom.clone(), Rc::new(copied));
                modified = true;
            }
        }
        modified
    }

    /// Overwrite the bindings described by `that` into `self`, keeping
    /// everything `that` says nothing about.
    pub fn replace_ml(&mut self, that: &HierMap<K, L>, cx: &K::Cx) -> bool {
        let mut modified = false;
        let finite = self.finite && that.finite;
        modified |= finite != self.finite;
        self.finite = finite;
        modified |= Self::replace_at(&mut self.root, &that.root, cx);
        modified
    }

    fn replace_at(this: &mut Node<K, L>, that: &Node<K, L>, cx: &K::Cx) -> bool {
        assert_eq!(
            this.singleton, that.singleton,
            "replacing across trees with mismatched singleton shape"
        );
        // overwrite outright; the new binding wins whatever was here
        let mut modified = true;
        this.val = that.val.clone();

        for (atom, that_child) in &that.children {
            if let Some(this_child) = this.children.get_mut(atom) {
                modified |= Self::replace_at(Rc::make_mut(this_child), that_child, cx);
            } else if let Some(copied) = that_child.clone_live(cx) {
                this.children.insert(atom.clone(), Rc::new(copied));
                modified = true;
            }
        }
        modified
    }

    /// Translate keys across a call/return boundary; see
    /// [`ListMap::remap_ml`](crate::list::ListMap::remap_ml) for the rule
    /// semantics. Returns a fresh map.
    pub fn remap_ml(
        &self,
        rules: &[RemapRule<K>],
        default: &L,
        from_cx: &K::Cx,
        cx: &K::Cx,
    ) -> HierMap<K, L> {
        let mut new = self.clone();
        let mut rule_used = vec![false; rules.len()];

        for (ri, rule) in rules.iter().enumerate() {
            // locate the node at the source key's full path, if any
            let (matched, singleton, val) = {
                let mut node = Some(&new.root);
                for atom in rule.from.hier_key() {
                    node = node.and_then(|n| n.children.get(atom).map(|c| &**c));
                }
                match node {
                    Some(n) => (true, n.singleton, n.val.clone()),
                    None => (false, false, None),
                }
            };

            if matched && singleton {
                assert!(
                    rule.from.is_singleton(from_cx),
                    "singleton node for a non-singleton key"
                );
                rule_used[ri] = true;
                if rule.replace {
                    new.remove(&rule.from, cx);
                }
                if let (Some(to), Some(v)) = (&rule.to, &val) {
                    new.insert(to.clone(), (**v).clone(), cx);
                }
            } else if let Some(to) = &rule.to {
                if matched {
                    rule_used[ri] = true;
                }
                // The source names a shared or missing set: bind the target
                // to whatever is known about the source and keep the
                // original binding.
                let known = self.get(&rule.from, default, from_cx);
                new.insert(to.clone(), known, cx);
            }
        }

        // Closed-world completion: a rule that touched nothing still binds
        // its live target to the default value. An empty default carries no
        // information and is rejected by insert, like any other empty value.
        for (ri, rule) in rules.iter().enumerate() {
            if rule_used[ri] || !rule.from.is_live(from_cx) {
                continue;
            }
            if let Some(to) = &rule.to {
                if to.is_live(cx) {
                    new.insert(to.clone(), default.clone(), cx);
                }
            }
        }
        new
    }

    /// Structural comparison of the two trees.
    pub fn equals(&self, that: &HierMap<K, L>, _cx: &K::Cx) -> bool {
        Self::node_eq(&self.root, &that.root)
    }

    fn node_eq(a: &Node<K, L>, b: &Node<K, L>) -> bool {
        a.singleton == b.singleton
            && a.val == b.val
            && a.children.len() == b.children.len()
            && a.children
                .iter()
                .zip(&b.children)
                .all(|((ka, ca), (kb, cb))| ka == kb && Self::node_eq(ca, cb))
    }

    pub fn finite_lattice(&self) -> bool {
        self.finite
    }
}

impl<K: AbstractObject, L: Lattice> fmt::Display for HierMap<K, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_node(&mut out, &self.root, 0);
        write!(f, "HierMap [\n{}]", out)
    }
}
