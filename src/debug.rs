//! Debug utilities for inspecting map structure.
//!
//! These helpers back the `Display` implementations and are primarily
//! useful in tests and during development.

use std::fmt::Write;

use crate::lattice::Lattice;
use crate::node::Node;
use crate::object::AbstractObject;

/// Render a hierarchy node and its subtree as indented lines, one node per
/// line: the selecting atom, the singleton marker, and the value if any.
pub(crate) fn write_node<K: AbstractObject, L: Lattice>(
    out: &mut String,
    node: &Node<K, L>,
    depth: usize,
) {
    let pad = "  ".repeat(depth + 1);
    let atom = match &node.atom {
        Some(a) => format!("[{:?}]", a),
        None => "(root)".to_string(),
    };
    let singleton = if node.singleton { " (singleton)" } else { "" };
    match &node.val {
        Some(v) => {
            let _ = writeln!(out, "{}{}{} => {:?}", pad, atom, singleton, v);
        }
        None => {
            let _ = writeln!(out, "{}{}{}", pad, atom, singleton);
        }
    }
    for child in node.children.values() {
        write_node(out, child, depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use crate::domains::SetLattice;
    use crate::fixtures::{Path, TestCx};
    use crate::hier::HierMap;

    #[test]
    fn test_render_shows_atoms_and_values() {
        let cx = TestCx::default();
        let mut m = HierMap::new();
        m.insert(Path::shared("arr", vec![3]), SetLattice::of([7i64]), &cx);
        m.insert(Path::shared("arr0", vec![3, 0]), SetLattice::of([9i64]), &cx);

        let rendered = m.to_string();
        assert!(rendered.contains("(root)"), "missing root line: {}", rendered);
        assert!(rendered.contains("[3]"), "missing atom line: {}", rendered);
        assert!(rendered.contains('7'), "missing value: {}", rendered);
        assert!(rendered.contains('9'), "missing child value: {}", rendered);
    }
}
