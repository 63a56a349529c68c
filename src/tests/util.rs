use crate::{Branch, Kind, NodeId, Tree};

macro_rules! sym {
    ($tree:expr, $c:expr) => {
        $tree.new_symbol(crate::Kind::Ordinary, $c)
    };
    ($tree:expr, $kind:ident, $c:expr) => {
        $tree.new_symbol(crate::Kind::$kind, $c)
    };
}

/// Appends one ordinary symbol node per character of `text` to the given
/// branch, returning the new nodes in order.
pub fn attach_symbols(tree: &mut Tree, parent: NodeId, branch: Branch, text: &str) -> Vec<NodeId> {
    let ids: Vec<NodeId> = text.chars().map(|c| tree.new_symbol(Kind::Ordinary, c)).collect();
    tree.add_children(parent, branch, &ids);
    ids
}

/// Appends symbols to the root's body.
pub fn attach_to_root(tree: &mut Tree, text: &str) -> Vec<NodeId> {
    let root = tree.root();
    attach_symbols(tree, root, Branch::Body, text)
}

/// Clears the dirty flag on the given nodes, so a test can observe exactly
/// which nodes the next mutation marks.
pub fn clean(tree: &mut Tree, ids: &[NodeId]) {
    for &id in ids {
        tree.node_mut(id).dirty = false;
    }
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
