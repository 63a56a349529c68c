//! Canonical markup serialization.
//!
//! A node that still carries the verbatim source it was parsed from
//! round-trips unchanged; everything else is re-emitted canonically. Node
//! lists are partitioned into maximal runs sharing a formatting property
//! (style class, then color, then mode) so each run can be wrapped once
//! instead of per node.

use tracing::trace;

use crate::node::{Branch, FontSeries, FontShape, Kind, Mode, NodeId, Style, Tree, Value};

#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub struct SerializeOptions {
    /// Skip the verbatim fast path and re-emit canonical markup for every
    /// subtree.
    pub expand_macros: bool,
}

/// Serializes a single node, including its sub/superscript suffix.
pub fn serialize_node(tree: &Tree, id: NodeId, options: SerializeOptions) -> String {
    let node = tree.node(id);

    if node.kind == Kind::First {
        return String::new();
    }
    if !options.expand_macros {
        if let Some(verbatim) = node.verbatim_latex() {
            return verbatim.to_string();
        }
    }

    let suffix = supsub_suffix(tree, id, options);
    let body = || serialize_list(tree, tree.branch(id, Branch::Body), options);

    let nucleus = match node.kind {
        Kind::Fraction => {
            let above = serialize_list(tree, tree.branch(id, Branch::Above), options);
            let below = serialize_list(tree, tree.branch(id, Branch::Below), options);
            let command = node.command.as_deref().unwrap_or("\\frac");
            format!("{command}{{{above}}}{{{below}}}")
        }
        Kind::Surd => {
            let command = node.command.as_deref().unwrap_or("\\sqrt");
            format!("{command}{{{}}}", body())
        }
        Kind::Enclose => {
            let command = node.command.as_deref().unwrap_or("\\boxed");
            format!("{command}{{{}}}", body())
        }
        Kind::Accent => {
            let command = node.command.as_deref().unwrap_or("\\hat");
            format!("{command}{{{}}}", body())
        }
        Kind::Array => serialize_array(tree, id, options),
        Kind::Placeholder => String::from("\\placeholder{}"),
        Kind::Spacing => node.command.clone().unwrap_or_else(|| String::from("\\,")),
        Kind::Group => match &node.command {
            Some(command) => format!("{command}{{{}}}", body()),
            None => format!("{{{}}}", body()),
        },
        _ => {
            if !tree.has_empty_branch(id, Branch::Body) {
                match &node.command {
                    Some(command) => format!("{command}{{{}}}", body()),
                    None => body(),
                }
            } else if let Some(value) = &node.value {
                value_to_latex(node.mode, value, node.command.as_deref())
            } else {
                node.command.clone().unwrap_or_default()
            }
        }
    };

    format!("{nucleus}{suffix}")
}

/// Serializes an ordered node list. Absent and empty lists both yield
/// empty text; a leading sentinel is stripped (a sentinel alone yields
/// empty text).
pub fn serialize_list(tree: &Tree, nodes: Option<&[NodeId]>, options: SerializeOptions) -> String {
    let Some(mut nodes) = nodes else {
        return String::new();
    };
    if let Some(&first) = nodes.first() {
        if tree.node(first).kind == Kind::First {
            if nodes.len() == 1 {
                return String::new();
            }
            nodes = &nodes[1..];
        }
    }
    if nodes.is_empty() {
        return String::new();
    }
    trace!(count = nodes.len(), "serialize run");

    let mut result = String::new();
    for class_run in chunk_by(nodes, |id| class_key(&tree.node(id).style)) {
        let style = tree.node(class_run[0]).style.clone();
        let mut content = String::new();
        for color_run in chunk_by(class_run, |id| tree.node(id).style.color.clone()) {
            let color = tree.node(color_run[0]).style.color.clone();
            let mut inner = String::new();
            for mode_run in chunk_by(color_run, |id| tree.node(id).mode) {
                let mode = tree.node(mode_run[0]).mode;
                let text: String =
                    mode_run.iter().map(|&id| serialize_node(tree, id, options)).collect();
                if mode == Mode::Text && !text.is_empty() {
                    inner.push_str(&format!("\\text{{{text}}}"));
                } else {
                    inner.push_str(&text);
                }
            }
            match color {
                Some(color) if !inner.is_empty() => {
                    content.push_str(&format!("\\textcolor{{{color}}}{{{inner}}}"));
                }
                _ => content.push_str(&inner),
            }
        }
        result.push_str(&class_wrap(&style, &content));
    }
    result
}

/// The sub/superscript suffix of a node. Single-character script content
/// is emitted unbraced, except for the two glyphs that re-expand into their
/// named macro forms.
fn supsub_suffix(tree: &Tree, id: NodeId, options: SerializeOptions) -> String {
    let mut result = String::new();
    for (branch, prefix) in [(Branch::Superscript, '^'), (Branch::Subscript, '_')] {
        if tree.has_empty_branch(id, branch) {
            continue;
        }
        let content = serialize_list(tree, tree.branch(id, branch), options);
        if content.is_empty() {
            continue;
        }
        let mut chars = content.chars();
        let first = chars.next().unwrap();
        if chars.next().is_none() {
            if branch == Branch::Superscript && first == '\u{2032}' {
                result.push_str("^\\prime ");
            } else if branch == Branch::Superscript && first == '\u{2033}' {
                result.push_str("^\\doubleprime ");
            } else {
                result.push(prefix);
                result.push(first);
            }
        } else {
            result.push(prefix);
            result.push('{');
            result.push_str(&content);
            result.push('}');
        }
    }
    result
}

fn serialize_array(tree: &Tree, id: NodeId, options: SerializeOptions) -> String {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut current_row = None;
    for branch in tree.branch_names(id) {
        let Branch::Cell(row, _) = branch else { continue };
        if current_row != Some(row) {
            rows.push(Vec::new());
            current_row = Some(row);
        }
        rows.last_mut()
            .unwrap()
            .push(serialize_list(tree, tree.branch(id, branch), options));
    }
    let body =
        rows.iter().map(|row| row.join(" & ")).collect::<Vec<_>>().join(" \\\\ ");
    format!("\\begin{{matrix}}{body}\\end{{matrix}}")
}

fn value_to_latex(mode: Mode, value: &Value, command: Option<&str>) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Text(s) => s.chars().map(|c| if c.is_whitespace() { '~' } else { c }).collect(),
        Value::Symbol(c) => symbol_to_latex(mode, *c)
            .map(str::to_string)
            .or_else(|| command.map(str::to_string))
            .unwrap_or_else(|| c.to_string()),
    }
}

/// Mode-aware symbol-to-markup table for characters whose canonical markup
/// is not themselves.
fn symbol_to_latex(mode: Mode, c: char) -> Option<&'static str> {
    if mode == Mode::Text {
        return match c {
            '~' => Some("\\textasciitilde "),
            _ => None,
        };
    }
    match c {
        '×' => Some("\\times "),
        '÷' => Some("\\div "),
        '±' => Some("\\pm "),
        '∓' => Some("\\mp "),
        '−' => Some("-"),
        '⋅' => Some("\\cdot "),
        '∞' => Some("\\infty "),
        '≤' => Some("\\le "),
        '≥' => Some("\\ge "),
        '≠' => Some("\\ne "),
        '→' => Some("\\to "),
        '∈' => Some("\\in "),
        '∑' => Some("\\sum "),
        '∏' => Some("\\prod "),
        '∫' => Some("\\int "),
        'α' => Some("\\alpha "),
        'β' => Some("\\beta "),
        'π' => Some("\\pi "),
        'θ' => Some("\\theta "),
        _ => None,
    }
}

type ClassKey = (Option<String>, Option<FontShape>, Option<FontSeries>);

fn class_key(style: &Style) -> ClassKey {
    (style.font_family.clone(), style.font_shape, style.font_series)
}

fn class_wrap(style: &Style, content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }
    match (style.font_series, style.font_shape) {
        (Some(FontSeries::Bold), _) => format!("\\mathbf{{{content}}}"),
        (_, Some(FontShape::Upright)) => format!("\\mathrm{{{content}}}"),
        (_, Some(FontShape::Italic)) => format!("\\mathit{{{content}}}"),
        _ => content.to_string(),
    }
}

/// Splits `nodes` into maximal runs over which `key` is constant.
fn chunk_by<K: PartialEq>(nodes: &[NodeId], key: impl Fn(NodeId) -> K) -> Vec<&[NodeId]> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..nodes.len() {
        if key(nodes[i]) != key(nodes[start]) {
            runs.push(&nodes[start..i]);
            start = i;
        }
    }
    if start < nodes.len() {
        runs.push(&nodes[start..]);
    }
    runs
}
