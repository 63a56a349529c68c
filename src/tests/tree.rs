use crate::{Branch, Kind, Style, Tree, TreeError};

use super::util::{attach_symbols, clean};

#[test]
fn empty_branch_detection() {
    let mut tree = Tree::new();
    let group = tree.new_node(Kind::Group);
    tree.add_child(tree.root(), Branch::Body, group);

    // Never created.
    assert!(tree.has_empty_branch(group, Branch::Body));

    // Created: holds only the sentinel.
    tree.create_branch(group, Branch::Body);
    assert!(tree.has_empty_branch(group, Branch::Body));
    assert_eq!(tree.branch(group, Branch::Body).unwrap().len(), 1);

    let x = sym!(tree, 'x');
    tree.add_child(group, Branch::Body, x);
    assert!(!tree.has_empty_branch(group, Branch::Body));
    assert_eq!(tree.branch(group, Branch::Body).unwrap().len(), 2);
}

#[test]
fn branch_starts_with_sentinel() {
    let mut tree = Tree::new();
    let group = tree.new_node(Kind::Group);
    tree.add_child(tree.root(), Branch::Body, group);
    let x = sym!(tree, 'x');
    tree.add_child(group, Branch::Superscript, x);

    let children = tree.branch(group, Branch::Superscript).unwrap();
    assert_eq!(tree.node(children[0]).kind, Kind::First);
    assert_eq!(children[1], x);
    assert_eq!(tree.node(children[0]).parent(), Some(group));
    assert_eq!(tree.node(children[0]).tree_branch(), Some(Branch::Superscript));
}

#[test]
fn dirty_propagation_marks_ancestor_chain_only() {
    let mut tree = Tree::new();
    let outer = tree.new_node(Kind::Group);
    let inner = tree.new_node(Kind::Group);
    let bystander = tree.new_node(Kind::Group);
    tree.add_child(tree.root(), Branch::Body, outer);
    tree.add_child(tree.root(), Branch::Body, bystander);
    tree.add_child(outer, Branch::Body, inner);

    let all = [tree.root(), outer, inner, bystander];
    clean(&mut tree, &all);

    let x = sym!(tree, 'x');
    tree.add_child(inner, Branch::Body, x);

    assert!(tree.is_dirty(inner));
    assert!(tree.is_dirty(outer));
    assert!(tree.is_dirty(tree.root()));
    assert!(!tree.is_dirty(bystander));
}

#[test]
fn dirty_is_idempotent_and_monotonic() {
    let mut tree = Tree::new();
    let group = tree.new_node(Kind::Group);
    tree.add_child(tree.root(), Branch::Body, group);

    tree.mark_dirty(group);
    assert!(tree.is_dirty(group));
    tree.mark_dirty(group);
    assert!(tree.is_dirty(group));
    assert!(tree.is_dirty(tree.root()));
}

#[test]
fn remove_child_on_sentinel_is_noop() {
    let mut tree = Tree::new();
    let group = tree.new_node(Kind::Group);
    tree.add_child(tree.root(), Branch::Body, group);
    attach_symbols(&mut tree, group, Branch::Body, "xy");

    let sentinel = tree.branch(group, Branch::Body).unwrap()[0];
    assert_eq!(tree.node(sentinel).kind, Kind::First);

    assert!(tree.remove_child(sentinel).is_ok());
    assert_eq!(tree.branch(group, Branch::Body).unwrap().len(), 3);
    assert_eq!(tree.node(sentinel).parent(), Some(group));
}

#[test]
fn remove_child_requires_a_parent() {
    let mut tree = Tree::new();
    let stray = sym!(tree, 'x');
    assert_eq!(tree.remove_child(stray), Err(TreeError::NotAChild));
}

#[test]
fn set_children_rejects_sentinel_content() {
    let mut tree = Tree::new();
    let group = tree.new_node(Kind::Group);
    tree.add_child(tree.root(), Branch::Body, group);

    let stray_sentinel = tree.new_node(Kind::First);
    let x = sym!(tree, 'x');
    assert_eq!(
        tree.set_children(group, Branch::Body, vec![stray_sentinel, x]),
        Err(TreeError::SentinelInContent)
    );
}

#[test]
fn set_children_reparents_and_reinserts_sentinel() {
    let mut tree = Tree::new();
    let group = tree.new_node(Kind::Group);
    tree.add_child(tree.root(), Branch::Body, group);
    attach_symbols(&mut tree, group, Branch::Body, "old");

    let a = sym!(tree, 'a');
    let b = sym!(tree, 'b');
    tree.set_children(group, Branch::Body, vec![a, b]).unwrap();

    let children = tree.branch(group, Branch::Body).unwrap();
    assert_eq!(children.len(), 3);
    assert_eq!(tree.node(children[0]).kind, Kind::First);
    assert_eq!(&children[1..], &[a, b]);
    assert_eq!(tree.node(a).parent(), Some(group));
    assert_eq!(tree.node(a).tree_branch(), Some(Branch::Body));
}

#[test]
fn ownership_is_exclusive() {
    let mut tree = Tree::new();
    let g1 = tree.new_node(Kind::Group);
    let g2 = tree.new_node(Kind::Group);
    tree.add_child(tree.root(), Branch::Body, g1);
    tree.add_child(tree.root(), Branch::Body, g2);

    let x = sym!(tree, 'x');
    tree.add_child(g1, Branch::Body, x);
    tree.add_child(g2, Branch::Body, x);

    assert!(tree.has_empty_branch(g1, Branch::Body));
    assert_eq!(tree.node(x).parent(), Some(g2));
    assert_eq!(tree.branch(g2, Branch::Body).unwrap()[1], x);
}

#[test]
fn insert_before_and_after_sibling() {
    let mut tree = Tree::new();
    let group = tree.new_node(Kind::Group);
    tree.add_child(tree.root(), Branch::Body, group);
    let ids = attach_symbols(&mut tree, group, Branch::Body, "ac");

    let b = sym!(tree, 'b');
    tree.add_child_after(b, ids[0]).unwrap();
    let d = sym!(tree, 'd');
    tree.add_child_before(d, ids[0]).unwrap();

    let children = tree.branch(group, Branch::Body).unwrap();
    assert_eq!(&children[1..], &[d, ids[0], b, ids[1]]);

    let detached = sym!(tree, 'z');
    let anchor = sym!(tree, 'q');
    assert_eq!(tree.add_child_before(detached, anchor), Err(TreeError::NotASibling));
}

#[test]
fn remove_branch_detaches_children() {
    let mut tree = Tree::new();
    let group = tree.new_node(Kind::Group);
    tree.add_child(tree.root(), Branch::Body, group);
    let ids = attach_symbols(&mut tree, group, Branch::Body, "ab");

    let removed = tree.remove_branch(group, Branch::Body);
    assert_eq!(removed, ids);
    assert!(tree.branch(group, Branch::Body).is_none());
    assert_eq!(tree.node(ids[0]).parent(), None);
    assert_eq!(tree.node(ids[0]).tree_branch(), None);
}

#[test]
fn sibling_navigation() {
    let mut tree = Tree::new();
    let group = tree.new_node(Kind::Group);
    tree.add_child(tree.root(), Branch::Body, group);
    let ids = attach_symbols(&mut tree, group, Branch::Body, "abc");
    let sentinel = tree.branch(group, Branch::Body).unwrap()[0];

    assert_eq!(tree.first_sibling(ids[0]), Some(sentinel));
    assert_eq!(tree.last_sibling(ids[0]), Some(ids[2]));
    assert_eq!(tree.left_sibling(ids[0]), Some(sentinel));
    assert_eq!(tree.left_sibling(sentinel), None);
    assert_eq!(tree.right_sibling(ids[0]), Some(ids[1]));
    assert_eq!(tree.right_sibling(ids[2]), None);
    assert!(tree.is_first_sibling(sentinel));
    assert!(!tree.is_first_sibling(ids[0]));
    assert!(tree.is_last_sibling(ids[2]));

    // A root node has no siblings.
    assert_eq!(tree.first_sibling(tree.root()), None);
    assert_eq!(tree.right_sibling(tree.root()), None);
}

#[test]
fn common_ancestor_of_node_with_itself_is_its_parent() {
    let mut tree = Tree::new();
    let group = tree.new_node(Kind::Group);
    tree.add_child(tree.root(), Branch::Body, group);
    let ids = attach_symbols(&mut tree, group, Branch::Body, "ab");

    assert_eq!(tree.common_ancestor(ids[0], ids[0]), Some(group));
    assert_eq!(tree.common_ancestor(tree.root(), tree.root()), None);
}

#[test]
fn common_ancestor_of_two_leaf_siblings_is_their_parent() {
    // Depth-3 tree: root -> group -> two leaves, plus a leaf directly
    // under the root.
    let mut tree = Tree::new();
    let group = tree.new_node(Kind::Group);
    tree.add_child(tree.root(), Branch::Body, group);
    let leaves = attach_symbols(&mut tree, group, Branch::Body, "ab");
    let outside = sym!(tree, 'c');
    tree.add_child(tree.root(), Branch::Body, outside);

    assert_eq!(tree.common_ancestor(leaves[0], leaves[1]), Some(group));
    assert_eq!(tree.common_ancestor(leaves[0], outside), Some(tree.root()));
    // An ancestor of the other node is itself the answer.
    assert_eq!(tree.common_ancestor(leaves[0], group), Some(group));
}

#[test]
fn character_box_classification() {
    let mut tree = Tree::new();
    let bin = sym!(tree, Binary, '+');
    let ord = sym!(tree, 'x');
    assert!(tree.is_character_box(bin));
    assert!(!tree.is_character_box(ord));

    // Classification descends through the body to the initial base
    // element.
    let group = tree.new_node(Kind::Group);
    let rel = sym!(tree, Relation, '=');
    tree.add_child(group, Branch::Body, rel);
    assert_eq!(tree.initial_base_element(group), rel);
    assert!(tree.is_character_box(group));

    let group2 = tree.new_node(Kind::Group);
    let plain = sym!(tree, 'y');
    tree.add_child(group2, Branch::Body, plain);
    assert!(!tree.is_character_box(group2));
}

#[test]
fn flattened_children_cache_invalidates_on_mutation() {
    let mut tree = Tree::new();
    let group = tree.new_node(Kind::Group);
    tree.add_child(tree.root(), Branch::Body, group);
    attach_symbols(&mut tree, group, Branch::Body, "ab");

    let before = tree.children(tree.root());
    assert!(before.contains(&group));

    let c = sym!(tree, 'c');
    tree.add_child(group, Branch::Body, c);
    let after = tree.children(tree.root());
    assert!(after.contains(&c));
    assert_eq!(after.len(), before.len() + 1);
}

#[test]
fn computed_style_merges_with_deeper_overrides_winning() {
    let mut tree = Tree::new();
    let group = tree.new_node(Kind::Group);
    tree.add_child(tree.root(), Branch::Body, group);
    let ids = attach_symbols(&mut tree, group, Branch::Body, "ab");

    tree.set_style(group, Style { color: Some("red".into()), ..Style::default() });
    tree.set_style(
        ids[0],
        Style { font_size: Some(3), ..Style::default() },
    );
    tree.set_style(
        ids[1],
        Style { color: Some("blue".into()), ..Style::default() },
    );

    let first = tree.computed_style(ids[0]);
    assert_eq!(first.color.as_deref(), Some("red"));
    assert_eq!(first.font_size, Some(3));

    let second = tree.computed_style(ids[1]);
    assert_eq!(second.color.as_deref(), Some("blue"));
}
