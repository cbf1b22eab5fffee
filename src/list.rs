//! The general-purpose map representation: an ordered list of bindings.
//!
//! Correct for any aliasing relation among keys. Order is significant:
//! the front of the list is the most recently asserted binding, which
//! encodes "most recent write wins" for alias-set queries.

use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::lattice::Lattice;
use crate::object::AbstractObject;
use crate::remap::RemapRule;

#[derive(Debug, Clone)]
pub(crate) struct Entry<K, L> {
    pub(crate) key: K,
    pub(crate) val: Rc<L>,
}

/// List-backed map over keys with arbitrary aliasing.
///
/// # Invariants
///
/// - No two settled entries are mutually must-equal; duplicates are merged
///   or evicted on insert. Entries that are only may-equal to each other
///   may legitimately coexist.
/// - `finite` is the conjunction of all inserted values' finiteness.
#[derive(Debug, Clone)]
pub struct ListMap<K: AbstractObject, L: Lattice> {
    entries: VecDeque<Entry<K, L>>,
    finite: bool,
}

impl<K: AbstractObject, L: Lattice> Default for ListMap<K, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: AbstractObject, L: Lattice> ListMap<K, L> {
    pub fn new() -> Self {
        ListMap {
            entries: VecDeque::new(),
            finite: true,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a binding to the frontier. Returns `true` iff the map changed.
    ///
    /// The incoming key is matched against existing entries front-to-back:
    /// a must-equal match is a definite overwrite, an equal-set match melds
    /// the values in place, and a may-equal match adds a new front entry
    /// while keeping the old one visible to future may-equal queries. Once
    /// the insertion settles, one sweep over the remaining entries evicts
    /// keys the settled binding subsumes.
    pub fn insert(&mut self, key: K, val: L, cx: &K::Cx) -> bool {
        if !key.is_live(cx) {
            debug!("insert: dropping dead key {:?}", key);
            return false;
        }
        self.finite = self.finite && val.is_finite();

        let val = Rc::new(val);
        let mut modified = false;
        // Index of the entry that now holds the binding for `key`.
        let mut settled: Option<usize> = None;

        let mut i = 0;
        while i < self.entries.len() {
            if let Some(s) = settled {
                // Sweep: evict later entries the settled binding subsumes.
                // Removals happen at i > s, so `s` stays valid.
                if key.must_equal(&self.entries[i].key, cx) {
                    self.entries.remove(i);
                    modified = true;
                    continue;
                }
                if key.equal_set(&self.entries[i].key, cx) {
                    if let Some(evicted) = self.entries.remove(i) {
                        Rc::make_mut(&mut self.entries[s].val).meet_update(&evicted.val);
                    }
                    modified = true;
                    continue;
                }
                i += 1;
            } else if key.must_equal(&self.entries[i].key, cx) {
                if *self.entries[i].val != *val {
                    // definite overwrite: drop the stale binding and assert
                    // the new one at the front
                    debug!("insert: must-equal overwrite of {:?}", self.entries[i].key);
                    self.entries.remove(i);
                    self.entries.push_front(Entry {
                        key: key.clone(),
                        val: val.clone(),
                    });
                    settled = Some(0);
                    modified = true;
                    // everything shifted by one; resume after the old match
                    i += 1;
                } else {
                    // identical value: keep the existing entry untouched
                    settled = Some(i);
                    i += 1;
                }
            } else if key.equal_set(&self.entries[i].key, cx) {
                // same set, possibly different concrete member per
                // execution: accumulate into the existing entry
                modified |= Rc::make_mut(&mut self.entries[i].val).meet_update(&val);
                settled = Some(i);
                i += 1;
            } else if key.may_equal(&self.entries[i].key, cx) {
                // overlapping but not provably identical sets: the old
                // binding must stay visible, so add a fresh front entry
                debug!("insert: may-equal with {:?}, keeping both", self.entries[i].key);
                self.entries.push_front(Entry {
                    key: key.clone(),
                    val: val.clone(),
                });
                settled = Some(0);
                modified = true;
                // the matched entry slid to i + 1; resume past it
                i += 2;
            } else {
                i += 1;
            }
        }

        if settled.is_none() {
            self.entries.push_front(Entry { key, val });
            modified = true;
        }

        // Opportunistic cleanup. A bound on the list length would also be
        // enforced here, but none is implemented.
        self.sweep_empty(cx);

        modified
    }

    /// Drop entries whose key died or whose value carries no information.
    fn sweep_empty(&mut self, cx: &K::Cx) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.key.is_live(cx) && !e.val.is_empty());
        self.entries.len() != before
    }

    /// Erase the binding that must-equals `key`, if any. Removal models a
    /// definite overwrite, so only a must-equal match qualifies, and at
    /// most one can exist.
    pub fn remove(&mut self, key: &K, cx: &K::Cx) -> bool {
        if let Some(pos) = self
            .entries
            .iter()
            .position(|e| key.must_equal(&e.key, cx))
        {
            self.entries.remove(pos);
            true
        } else {
            false
        }
    }

    /// Accumulate the values of every entry whose key may-equal `key`,
    /// stopping at a must-equal entry: nothing before it can also be
    /// must-equal, and its value already covers the most recent write.
    pub fn get(&self, key: &K, default: &L, cx: &K::Cx) -> L {
        let mut acc: Option<L> = None;
        for e in &self.entries {
            if key.may_equal(&e.key, cx) {
                match &mut acc {
                    None => acc = Some((*e.val).clone()),
                    Some(a) => {
                        a.meet_update(&e.val);
                    }
                }
                if key.must_equal(&e.key, cx) {
                    break;
                }
            }
        }
        acc.unwrap_or_else(|| default.clone())
    }

    /// Raise the value of every entry whose key may-equal `probe` to full:
    /// anything that could alias the probe becomes unknown.
    pub fn set_ml_value_to_full(&mut self, probe: &K, cx: &K::Cx) -> bool {
        let mut modified = false;
        for e in &mut self.entries {
            if e.key.may_equal(probe, cx) {
                modified |= Rc::make_mut(&mut e.val).set_to_full();
            }
        }
        modified
    }

    pub fn is_full_lat(&self) -> bool {
        false
    }

    /// Whether the map carries no information, sweeping dead and empty
    /// bindings out along the way.
    pub fn is_empty_lat(&mut self, cx: &K::Cx) -> bool {
        self.sweep_empty(cx);
        self.entries.is_empty()
    }

    /// Merge-over-paths: fold `that`'s bindings into `self`.
    ///
    /// Entries denoting the same set (equal-set) are paired and their
    /// values melded; the unpaired remainder of `that` is interleaved
    /// between the pairing anchors, preserving its relative order. The
    /// resulting order is a heuristic approximation of the union of the
    /// two path histories; it can lose precision relative to an ideal
    /// interleave.
    pub fn meet_update(&mut self, that: &ListMap<K, L>, cx: &K::Cx) -> bool {
        let mut modified = false;
        let finite = self.finite && that.finite;
        modified |= finite != self.finite;
        self.finite = finite;

        // Pairings of equal-set keys, as (self index, that index), in self
        // order. Paired values meld immediately.
        let mut pairs: Vec<(usize, usize)> = Vec::new();
        let mut that_paired = vec![false; that.entries.len()];
        for i in 0..self.entries.len() {
            for (j, te) in that.entries.iter().enumerate() {
                if self.entries[i].key.equal_set(&te.key, cx) {
                    pairs.push((i, j));
                    that_paired[j] = true;
                    modified |= Rc::make_mut(&mut self.entries[i].val).meet_update(&te.val);
                }
            }
        }

        // Interleave: before each pairing anchor, copy over the unpaired
        // entries of `that` that precede the anchor's partner and were not
        // consumed by an earlier anchor.
        let mut cursor = 0; // next unconsidered index in that
        let mut shift = 0; // entries inserted into self so far
        for &(i, j) in &pairs {
            if j >= cursor {
                let mut at = i + shift;
                for (k, te) in that.entries.iter().enumerate().take(j).skip(cursor) {
                    if !that_paired[k] {
                        self.entries.insert(at, te.clone());
                        at += 1;
                        shift += 1;
                        modified = true;
                    }
                }
                cursor = j + 1;
            }
        }
        // Whatever is left in `that` was passed by no anchor; append it.
        for te in that.entries.iter().skip(cursor) {
            self.entries.push_back(te.clone());
            modified = true;
        }

        modified |= self.compress_dead(cx);
        modified
    }

    /// Overwrite the bindings described by `that` into `self`, keeping
    /// everything else.
    pub fn replace_ml(&mut self, that: &ListMap<K, L>, cx: &K::Cx) -> bool {
        let mut modified = false;
        for e in &that.entries {
            if !e.key.is_live(cx) {
                continue;
            }
            modified |= self.insert(e.key.clone(), (*e.val).clone(), cx);
        }
        modified
    }

    /// Meld and drop entries whose keys are must-equal to an earlier entry.
    pub fn compress_must_eq(&mut self, cx: &K::Cx) -> bool {
        let mut modified = false;
        let mut x = 0;
        while x < self.entries.len() {
            let mut y = x + 1;
            while y < self.entries.len() {
                if self.entries[x].key.must_equal(&self.entries[y].key, cx) {
                    if let Some(evicted) = self.entries.remove(y) {
                        Rc::make_mut(&mut self.entries[x].val).meet_update(&evicted.val);
                    }
                    modified = true;
                } else {
                    y += 1;
                }
            }
            x += 1;
        }
        modified
    }

    /// Drop every entry whose key is not live at `cx`.
    pub fn compress_dead(&mut self, cx: &K::Cx) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.key.is_live(cx));
        self.entries.len() != before
    }

    /// Translate keys across a call/return boundary. `from_cx` is the
    /// context the rules' source keys are in scope at; the target keys are
    /// in scope at `cx`. Returns a fresh map.
    pub fn remap_ml(
        &self,
        rules: &[RemapRule<K>],
        default: &L,
        from_cx: &K::Cx,
        cx: &K::Cx,
    ) -> ListMap<K, L> {
        let mut new = self.clone();
        let mut rule_used = vec![false; rules.len()];

        let mut i = 0;
        'entries: while i < new.entries.len() {
            for (ri, rule) in rules.iter().enumerate() {
                if rule.replace && new.entries[i].key.must_equal(&rule.from, from_cx) {
                    match &rule.to {
                        Some(to) => {
                            // rename in place, then evict later duplicates
                            // of the new key
                            new.entries[i].key = to.clone();
                            let mut j = i + 1;
                            while j < new.entries.len() {
                                if new.entries[j].key.must_equal(to, cx) {
                                    new.entries.remove(j);
                                } else {
                                    j += 1;
                                }
                            }
                        }
                        None => {
                            // the location has no meaning across the
                            // boundary
                            new.entries.remove(i);
                            rule_used[ri] = true;
                            continue 'entries;
                        }
                    }
                    rule_used[ri] = true;
                } else if new.entries[i].key.may_equal(&rule.from, from_cx) {
                    if let Some(to) = &rule.to {
                        // conservative addition sharing the same value; the
                        // overlapping binding stays
                        let val = new.entries[i].val.clone();
                        new.entries.insert(
                            i,
                            Entry {
                                key: to.clone(),
                                val,
                            },
                        );
                        i += 1; // the current entry slid one to the right
                        rule_used[ri] = true;
                    }
                }
            }
            i += 1;
        }

        // Closed-world completion: a rule that touched nothing still binds
        // its live target to the default value.
        for (ri, rule) in rules.iter().enumerate() {
            if rule_used[ri] || !rule.from.is_live(from_cx) {
                continue;
            }
            if let Some(to) = &rule.to {
                if to.is_live(cx) {
                    new.entries.push_back(Entry {
                        key: to.clone(),
                        val: Rc::new(default.clone()),
                    });
                }
            }
        }
        new
    }

    /// Structural comparison: same binding sequence, with keys compared by
    /// equal-set and values by lattice equality.
    pub fn equals(&self, that: &ListMap<K, L>, cx: &K::Cx) -> bool {
        self.entries.len() == that.entries.len()
            && self
                .entries
                .iter()
                .zip(&that.entries)
                .all(|(a, b)| a.key.equal_set(&b.key, cx) && *a.val == *b.val)
    }

    pub fn finite_lattice(&self) -> bool {
        self.finite
    }
}

impl<K: AbstractObject, L: Lattice> fmt::Display for ListMap<K, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ListMap [")?;
        for e in &self.entries {
            writeln!(f, "  {:?} => {:?}", e.key, e.val)?;
        }
        write!(f, "]")
    }
}
