use rust_decimal::Decimal;

use crate::serialize::{serialize_list, serialize_node, SerializeOptions};
use crate::{Branch, Kind, Mode, Style, Tree, Value};

use super::util::{attach_symbols, attach_to_root};

fn expand() -> SerializeOptions {
    SerializeOptions { expand_macros: true }
}

#[test]
fn verbatim_fast_path_round_trips() {
    let mut tree = Tree::new();
    let frac = tree.new_node(Kind::Fraction);
    tree.add_child(tree.root(), Branch::Body, frac);
    attach_symbols(&mut tree, frac, Branch::Above, "1");
    attach_symbols(&mut tree, frac, Branch::Below, "2");
    tree.set_verbatim_latex(frac, Some("\\dfrac{1}{2}".into()));

    // Unedited: the preserved source text comes back unchanged.
    assert_eq!(serialize_node(&tree, frac, SerializeOptions::default()), "\\dfrac{1}{2}");
    // Forced expansion must not take the fast path.
    assert_eq!(serialize_node(&tree, frac, expand()), "\\frac{1}{2}");
}

#[test]
fn mutation_invalidates_verbatim_cache() {
    let mut tree = Tree::new();
    let frac = tree.new_node(Kind::Fraction);
    tree.add_child(tree.root(), Branch::Body, frac);
    attach_symbols(&mut tree, frac, Branch::Above, "1");
    attach_symbols(&mut tree, frac, Branch::Below, "2");
    tree.set_verbatim_latex(frac, Some("\\dfrac{1}{2}".into()));

    attach_symbols(&mut tree, frac, Branch::Above, "3");
    assert_eq!(tree.node(frac).verbatim_latex(), None);
    assert_eq!(serialize_node(&tree, frac, SerializeOptions::default()), "\\frac{13}{2}");
}

#[test]
fn prime_superscript_expands_to_macro_form() {
    let mut tree = Tree::new();
    let x = sym!(tree, 'x');
    let prime = tree.new_symbol(Kind::Ordinary, '\u{2032}');
    tree.add_child(x, Branch::Superscript, prime);
    assert_eq!(serialize_node(&tree, x, SerializeOptions::default()), "x^\\prime ");

    let y = sym!(tree, 'y');
    let double = tree.new_symbol(Kind::Ordinary, '\u{2033}');
    tree.add_child(y, Branch::Superscript, double);
    assert_eq!(serialize_node(&tree, y, SerializeOptions::default()), "y^\\doubleprime ");
}

#[test]
fn single_character_scripts_are_unbraced() {
    let mut tree = Tree::new();
    let x = sym!(tree, 'x');
    attach_symbols(&mut tree, x, Branch::Superscript, "2");
    assert_eq!(serialize_node(&tree, x, SerializeOptions::default()), "x^2");

    let y = sym!(tree, 'y');
    attach_symbols(&mut tree, y, Branch::Superscript, "12");
    attach_symbols(&mut tree, y, Branch::Subscript, "n");
    assert_eq!(serialize_node(&tree, y, SerializeOptions::default()), "y^{12}_n");
}

#[test]
fn empty_script_branch_contributes_nothing() {
    let mut tree = Tree::new();
    let x = sym!(tree, 'x');
    tree.create_branch(x, Branch::Superscript);
    assert_eq!(serialize_node(&tree, x, SerializeOptions::default()), "x");
}

#[test]
fn sentinel_only_list_serializes_empty() {
    let mut tree = Tree::new();
    let group = tree.new_node(Kind::Group);
    tree.add_child(tree.root(), Branch::Body, group);
    tree.create_branch(group, Branch::Body);

    let branch = tree.branch(group, Branch::Body);
    assert_eq!(serialize_list(&tree, branch, SerializeOptions::default()), "");
    assert_eq!(serialize_list(&tree, None, SerializeOptions::default()), "");
}

#[test]
fn literal_values_serialize_textually() {
    let mut tree = Tree::new();
    let number = tree.new_node(Kind::Ordinary);
    tree.set_value(number, Some(Value::Number(Decimal::new(15, 1))));
    assert_eq!(serialize_node(&tree, number, SerializeOptions::default()), "1.5");

    let boolean = tree.new_node(Kind::Ordinary);
    tree.set_value(boolean, Some(Value::Boolean(true)));
    assert_eq!(serialize_node(&tree, boolean, SerializeOptions::default()), "true");

    let text = tree.new_node(Kind::Text);
    tree.set_value(text, Some(Value::Text("a b".into())));
    assert_eq!(serialize_node(&tree, text, SerializeOptions::default()), "a~b");
}

#[test]
fn symbol_table_with_command_fallback() {
    let mut tree = Tree::new();
    let times = tree.new_symbol(Kind::Binary, '×');
    assert_eq!(serialize_node(&tree, times, SerializeOptions::default()), "\\times ");

    let lambda = sym!(tree, 'λ');
    tree.set_command(lambda, Some("\\lambda ".into()));
    assert_eq!(serialize_node(&tree, lambda, SerializeOptions::default()), "\\lambda ");

    let plain = sym!(tree, 'k');
    assert_eq!(serialize_node(&tree, plain, SerializeOptions::default()), "k");
}

#[test]
fn command_with_body_wraps_in_braces() {
    let mut tree = Tree::new();
    let group = tree.new_node(Kind::Group);
    tree.set_command(group, Some("\\mathrm".into()));
    attach_symbols(&mut tree, group, Branch::Body, "ab");
    assert_eq!(serialize_node(&tree, group, SerializeOptions::default()), "\\mathrm{ab}");

    let bare = tree.new_node(Kind::Group);
    attach_symbols(&mut tree, bare, Branch::Body, "cd");
    assert_eq!(serialize_node(&tree, bare, SerializeOptions::default()), "{cd}");
}

#[test]
fn color_runs_are_grouped() {
    let mut tree = Tree::new();
    let ids = attach_to_root(&mut tree, "abc");
    tree.set_style(ids[0], Style { color: Some("red".into()), ..Style::default() });
    tree.set_style(ids[1], Style { color: Some("red".into()), ..Style::default() });
    tree.set_style(ids[2], Style { color: Some("blue".into()), ..Style::default() });

    assert_eq!(
        serialize_list(&tree, Some(&ids[..]), SerializeOptions::default()),
        "\\textcolor{red}{ab}\\textcolor{blue}{c}"
    );
}

#[test]
fn mode_runs_wrap_text_spans() {
    let mut tree = Tree::new();
    let ids = attach_to_root(&mut tree, "xhi");
    tree.node_mut(ids[1]).mode = Mode::Text;
    tree.node_mut(ids[2]).mode = Mode::Text;

    assert_eq!(
        serialize_list(&tree, Some(&ids[..]), SerializeOptions::default()),
        "x\\text{hi}"
    );
}

#[test]
fn list_with_leading_sentinel_skips_it() {
    let mut tree = Tree::new();
    let group = tree.new_node(Kind::Group);
    tree.add_child(tree.root(), Branch::Body, group);
    attach_symbols(&mut tree, group, Branch::Body, "ab");

    let branch = tree.branch(group, Branch::Body);
    assert_eq!(serialize_list(&tree, branch, SerializeOptions::default()), "ab");
}

#[test]
fn fraction_serializes_canonically() {
    let mut tree = Tree::new();
    let frac = tree.new_node(Kind::Fraction);
    tree.add_child(tree.root(), Branch::Body, frac);
    attach_symbols(&mut tree, frac, Branch::Above, "1");
    attach_symbols(&mut tree, frac, Branch::Below, "x2");
    attach_symbols(&mut tree, frac, Branch::Superscript, "3");

    assert_eq!(
        serialize_node(&tree, frac, SerializeOptions::default()),
        "\\frac{1}{x2}^3"
    );
}

#[test]
fn surd_serializes_body() {
    let mut tree = Tree::new();
    let surd = tree.new_node(Kind::Surd);
    tree.add_child(tree.root(), Branch::Body, surd);
    attach_symbols(&mut tree, surd, Branch::Body, "2");
    assert_eq!(serialize_node(&tree, surd, SerializeOptions::default()), "\\sqrt{2}");
}

#[test]
fn whole_tree_round_trip_through_root() {
    let mut tree = Tree::new();
    let ids = attach_to_root(&mut tree, "1+2");
    attach_symbols(&mut tree, ids[2], Branch::Superscript, "n");

    let branch = tree.branch(tree.root(), Branch::Body);
    assert_eq!(serialize_list(&tree, branch, SerializeOptions::default()), "1+2^n");
}
