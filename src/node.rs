//! Nodes of the hierarchical-key tree.
//!
//! A node is selected from its parent by one key atom; the concatenation of
//! atoms along the path from the root is the full key. A value stored at a
//! node applies to every key the node's key is a prefix of.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::lattice::Lattice;
use crate::object::AbstractObject;

/// One level of the hierarchical-key tree.
///
/// Children and values are shared (`Rc`) across structurally-copied maps;
/// every mutating path goes through [`Rc::make_mut`], which clones a shared
/// node or value before writing to it.
///
/// # Invariants
///
/// - `singleton` nodes denote one-element sets and never have children.
/// - `key` is present exactly on nodes a binding was inserted at; it caches
///   the inserted object so liveness can be asked about the full key.
#[derive(Debug, Clone)]
pub struct Node<K: AbstractObject, L: Lattice> {
    /// Atom selecting this node from its parent; `None` at the root.
    pub(crate) atom: Option<K::Atom>,
    /// The object whose full key ends here, if any.
    pub(crate) key: Option<K>,
    pub(crate) singleton: bool,
    /// Value mapped at this node; `None` reads as bottom.
    pub(crate) val: Option<Rc<L>>,
    pub(crate) children: BTreeMap<K::Atom, Rc<Node<K, L>>>,
}

impl<K: AbstractObject, L: Lattice> Node<K, L> {
    pub(crate) fn root() -> Self {
        Node {
            atom: None,
            key: None,
            singleton: false,
            val: None,
            children: BTreeMap::new(),
        }
    }

    /// Build the spine for the remaining atoms of a key, placing the
    /// binding at the leaf.
    pub(crate) fn chain(
        atom: K::Atom,
        rest: &[K::Atom],
        key: K,
        singleton: bool,
        val: Rc<L>,
    ) -> Self {
        match rest.split_first() {
            None => Node {
                atom: Some(atom),
                key: Some(key),
                singleton,
                val: Some(val),
                children: BTreeMap::new(),
            },
            Some((next, rest)) => {
                let mut children = BTreeMap::new();
                children.insert(
                    next.clone(),
                    Rc::new(Node::chain(next.clone(), rest, key, singleton, val)),
                );
                Node {
                    atom: Some(atom),
                    key: None,
                    singleton: false,
                    val: None,
                    children,
                }
            }
        }
    }

    /// Raise this node's own value to full, if it has one. A missing value
    /// reads as bottom and contributes nothing to queries, so there is
    /// nothing to invalidate.
    pub(crate) fn set_val_to_full(&mut self) -> bool {
        match &mut self.val {
            Some(v) => Rc::make_mut(v).set_to_full(),
            None => false,
        }
    }

    /// Raise this node's value to full and drop its subtree; children are
    /// redundant under a full ancestor. The value is materialized from
    /// `default` if the node had none.
    pub(crate) fn set_subtree_to_full(&mut self, default: &L) -> bool {
        let mut modified = match &mut self.val {
            Some(v) => Rc::make_mut(v).set_to_full(),
            None => {
                let mut full = default.clone();
                full.set_to_full();
                self.val = Some(Rc::new(full));
                true
            }
        };
        modified |= !self.children.is_empty();
        self.children.clear();
        modified
    }

    /// Fold the values of this node and its whole subtree into `acc`.
    pub(crate) fn meet_all_into(&self, acc: &mut L) -> bool {
        let mut modified = false;
        if let Some(v) = &self.val {
            modified |= acc.meet_update(v);
        }
        for child in self.children.values() {
            modified |= child.meet_all_into(acc);
        }
        modified
    }

    /// Whether the full key at this node may still be live at `cx`. Nodes
    /// without a cached key cannot be ruled out.
    pub(crate) fn is_live(&self, cx: &K::Cx) -> bool {
        self.key.as_ref().map_or(true, |k| k.is_live(cx))
    }

    /// Whether this node's entire subtree carries no information.
    pub(crate) fn is_empty_val(&self) -> bool {
        let own_empty = self.val.as_ref().map_or(true, |v| v.is_empty());
        own_empty && self.children.values().all(|c| c.is_empty_val())
    }

    /// Deep-copy this subtree, dropping nodes whose key is dead at `cx` and
    /// subtrees that end up empty. Values stay shared until written.
    pub(crate) fn clone_live(&self, cx: &K::Cx) -> Option<Self> {
        if !self.is_live(cx) {
            return None;
        }
        let mut children = BTreeMap::new();
        for (atom, child) in &self.children {
            if let Some(copied) = child.clone_live(cx) {
                children.insert(atom.clone(), Rc::new(copied));
            }
        }
        let node = Node {
            atom: self.atom.clone(),
            key: self.key.clone(),
            singleton: self.singleton,
            val: self.val.clone(),
            children,
        };
        if node.is_empty_val() {
            None
        } else {
            Some(node)
        }
    }
}
