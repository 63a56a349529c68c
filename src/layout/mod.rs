//! The layout engine: turns a run of sibling nodes into positioned boxes.
//!
//! Rendering is read-mostly over the tree; the only writes are the
//! self-healing flattened-children cache and the display identifier stamped
//! on each node so UI code can map boxes back to nodes.

pub mod scripts;

use tracing::trace;

use crate::metrics::{size_multiplier, FontMetrics, MathStyle};
use crate::node::{Branch, Kind, Limits, Mode, NodeId, ScriptsMode, Tree, Value};
use crate::render::{BoxCategory, MathBox, ShiftedBox, VAlign, VListChild};

/// Display identifier source. A seeded counter gives reproducible output
/// for testing and accessibility numbering.
#[derive(Clone, Debug)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> IdGenerator {
        IdGenerator::seeded(1)
    }

    pub fn seeded(seed: u64) -> IdGenerator {
        IdGenerator { next: seed }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for IdGenerator {
    fn default() -> IdGenerator {
        IdGenerator::new()
    }
}

/// Everything a render pass threads through the recursion.
#[derive(Clone, Debug)]
pub struct RenderContext<'a> {
    pub metrics: &'a FontMetrics,
    pub math_style: MathStyle,
    /// The enclosing run's style; differing from `math_style` triggers the
    /// post-assembly rescale that reconciles nested dimensions with the
    /// parent's coordinate scale.
    pub parent_style: MathStyle,
    /// Symbol size tier, 1..=10.
    pub size: u8,
    pub parent_size: u8,
    /// Grouped-numbering mode: adjacent digit/text runs share one id and
    /// selection display is suppressed.
    pub group_numbers: bool,
    /// The previous sibling's box, used as referent extent by zero-width
    /// placeholders.
    pub phantom_base: Option<MathBox>,
    ids: IdGenerator,
    override_id: Option<u64>,
}

impl<'a> RenderContext<'a> {
    pub fn new(metrics: &'a FontMetrics) -> RenderContext<'a> {
        RenderContext {
            metrics,
            math_style: MathStyle::Display,
            parent_style: MathStyle::Display,
            size: 5,
            parent_size: 5,
            group_numbers: false,
            phantom_base: None,
            ids: IdGenerator::new(),
            override_id: None,
        }
    }

    pub fn with_style(mut self, style: MathStyle) -> RenderContext<'a> {
        self.math_style = style;
        self.parent_style = style;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> RenderContext<'a> {
        self.ids = IdGenerator::seeded(seed);
        self
    }

    pub fn with_grouped_numbering(mut self) -> RenderContext<'a> {
        self.group_numbers = true;
        self
    }

    fn next_id(&mut self) -> u64 {
        match self.override_id {
            Some(id) => id,
            None => self.ids.next_id(),
        }
    }
}

/// Renders an ordered run of sibling nodes.
///
/// An absent input yields `None`; an empty input yields an empty list; a
/// non-empty input whose nodes all flatten to nothing yields `None`.
/// Callers must distinguish the three.
pub fn render_node_list(
    tree: &mut Tree,
    nodes: Option<&[NodeId]>,
    ctx: &mut RenderContext,
) -> Option<Vec<MathBox>> {
    let nodes = nodes?;
    if nodes.is_empty() {
        return Some(Vec::new());
    }
    trace!(count = nodes.len(), style = ?ctx.math_style, "render run");

    let mut boxes = if nodes.len() == 1 {
        let id = nodes[0];
        let selected = tree.node(id).selected && !ctx.group_numbers;
        let mut boxes = Vec::new();
        if let Some(mut b) = render_node(tree, id, ctx) {
            ctx.phantom_base = Some(b.clone());
            b.selected = selected;
            boxes.push(b);
        }
        boxes
    } else {
        render_run(tree, nodes, ctx)
    };

    if ctx.math_style != ctx.parent_style {
        let factor = ctx.math_style.multiplier() / ctx.parent_style.multiplier();
        for b in &mut boxes {
            b.rescale(factor);
        }
    }
    if ctx.size != ctx.parent_size {
        let factor = size_multiplier(ctx.size) / size_multiplier(ctx.parent_size);
        for b in &mut boxes {
            b.rescale(factor);
        }
    }

    if boxes.is_empty() {
        None
    } else {
        Some(boxes)
    }
}

/// Left-to-right accumulation over a multi-node run. Boxes of selected
/// nodes are buffered and spliced back as one contiguous stretch when the
/// selection run ends, so a selection never interleaves with unselected
/// boxes.
fn render_run(tree: &mut Tree, nodes: &[NodeId], ctx: &mut RenderContext) -> Vec<MathBox> {
    let mut boxes = Vec::new();
    let mut selection: Vec<MathBox> = Vec::new();
    // (run-is-digits, shared id) of the current grouped-numbering run.
    let mut numbering_run: Option<(bool, u64)> = None;

    for &id in nodes {
        if ctx.group_numbers {
            numbering_run = continue_numbering_run(tree, id, numbering_run, ctx);
        }

        let selected = tree.node(id).selected && !ctx.group_numbers;
        if let Some(mut b) = render_node(tree, id, ctx) {
            ctx.phantom_base = Some(b.clone());
            if selected {
                b.selected = true;
                selection.push(b);
            } else {
                boxes.append(&mut selection);
                boxes.push(b);
            }
        }
    }
    boxes.append(&mut selection);
    ctx.override_id = None;
    boxes
}

/// Grouped-numbering pass: runs of adjacent digit-or-text nodes with empty
/// scripts share one identifier, so a consumer can address the run as a
/// single unit. The run resets when the digit/text property flips, a
/// script is present, or the node is neither.
fn continue_numbering_run(
    tree: &Tree,
    id: NodeId,
    run: Option<(bool, u64)>,
    ctx: &mut RenderContext,
) -> Option<(bool, u64)> {
    let node = tree.node(id);
    let scripts_empty = tree.has_empty_branch(id, Branch::Superscript)
        && tree.has_empty_branch(id, Branch::Subscript);
    let digit = node.is_digit();
    let text = node.mode == Mode::Text;

    if (digit || text) && scripts_empty {
        match run {
            Some((run_digits, shared)) if run_digits == digit => {
                ctx.override_id = Some(shared);
                Some((run_digits, shared))
            }
            _ => {
                let shared = ctx.ids.next_id();
                ctx.override_id = Some(shared);
                Some((digit, shared))
            }
        }
    } else {
        ctx.override_id = None;
        None
    }
}

/// Renders a single node to a box, attaching its scripts.
pub fn render_node(tree: &mut Tree, id: NodeId, ctx: &mut RenderContext) -> Option<MathBox> {
    let kind = tree.node(id).kind;
    if kind == Kind::First {
        return None;
    }
    let descriptor = tree.kinds().descriptor(kind);

    let mut nucleus = match kind {
        Kind::Spacing => Some(MathBox::kern(1.0 / 6.0)),
        Kind::Placeholder => Some(render_placeholder(ctx)),
        Kind::Fraction => render_fraction(tree, id, ctx),
        Kind::Surd => render_surd(tree, id, ctx),
        Kind::Accent => render_accent(tree, id, ctx),
        Kind::Enclose => render_enclose(tree, id, ctx),
        Kind::Array => render_array(tree, id, ctx),
        _ => render_default(tree, id, descriptor.category, ctx),
    }?;

    nucleus.category = descriptor.category;
    nucleus.id = Some(ctx.next_id());
    tree.node_mut(id).render_id = nucleus.id;

    let use_limits = match tree.node(id).limits {
        Limits::Over => true,
        Limits::Adjacent => false,
        Limits::Auto => {
            descriptor.scripts == ScriptsMode::Limits && ctx.math_style.is_display()
        }
    };
    Some(if use_limits {
        scripts::attach_limits(tree, id, nucleus, ctx)
    } else {
        scripts::attach_scripts(tree, id, nucleus, ctx)
    })
}

/// Default nucleus: the body branch if it has content, otherwise the
/// literal value.
fn render_default(
    tree: &mut Tree,
    id: NodeId,
    category: BoxCategory,
    ctx: &mut RenderContext,
) -> Option<MathBox> {
    if !tree.has_empty_branch(id, Branch::Body) {
        let boxes = render_branch(tree, id, Branch::Body, ctx.math_style, ctx)?;
        if boxes.is_empty() {
            return None;
        }
        return Some(MathBox::hstack(category, boxes));
    }
    match tree.node(id).value.clone() {
        Some(Value::Symbol(c)) => Some(MathBox::glyph(category, c, ctx.metrics)),
        Some(Value::Number(n)) => Some(glyph_run(category, &n.to_string(), ctx.metrics)),
        Some(Value::Text(s)) => Some(glyph_run(category, &s, ctx.metrics)),
        Some(Value::Boolean(b)) => {
            Some(glyph_run(category, if b { "true" } else { "false" }, ctx.metrics))
        }
        None => None,
    }
}

fn glyph_run(category: BoxCategory, text: &str, metrics: &FontMetrics) -> MathBox {
    let glyphs = text.chars().map(|c| MathBox::glyph(category, c, metrics)).collect();
    MathBox::hstack(category, glyphs)
}

/// A zero-width box whose extent mirrors the phantom base, so invisible
/// placeholders take the vertical room of what they stand in for.
fn render_placeholder(ctx: &mut RenderContext) -> MathBox {
    let (height, depth) = match &ctx.phantom_base {
        Some(base) => (base.height, base.depth),
        None => {
            let g = ctx.metrics.glyph('0');
            (g.height, g.depth)
        }
    };
    MathBox { height, depth, ..MathBox::empty(BoxCategory::Ordinary) }
}

fn render_fraction(tree: &mut Tree, id: NodeId, ctx: &mut RenderContext) -> Option<MathBox> {
    let num = render_branch_box(tree, id, Branch::Above, ctx.math_style.fraction_numerator(), ctx)
        .unwrap_or_else(|| MathBox::empty(BoxCategory::Ordinary));
    let den =
        render_branch_box(tree, id, Branch::Below, ctx.math_style.fraction_denominator(), ctx)
            .unwrap_or_else(|| MathBox::empty(BoxCategory::Ordinary));
    let m = ctx.metrics;

    let rule = m.default_rule_thickness;
    let axis = m.axis_height;
    let clearance = if ctx.math_style.is_display() { 3.0 * rule } else { rule };
    let width = num.width.max(den.width);
    let num_shift = axis + rule / 2.0 + clearance + num.depth;
    let den_shift = -axis + rule / 2.0 + clearance + den.height;
    let num_margin = (width - num.width) / 2.0;
    let den_margin = (width - den.width) / 2.0;
    let bar = MathBox::rule(width, rule);

    Some(MathBox::vstack_individual(
        BoxCategory::Inner,
        vec![
            ShiftedBox { content: num, shift: -num_shift, margin_left: num_margin },
            ShiftedBox { content: bar, shift: -axis, margin_left: 0.0 },
            ShiftedBox { content: den, shift: den_shift, margin_left: den_margin },
        ],
    ))
}

fn render_surd(tree: &mut Tree, id: NodeId, ctx: &mut RenderContext) -> Option<MathBox> {
    let inner = render_branch_box(tree, id, Branch::Body, ctx.math_style.cramp(), ctx)
        .unwrap_or_else(|| MathBox::empty(BoxCategory::Ordinary));
    let m = ctx.metrics;

    let rule = m.default_rule_thickness;
    let clearance = rule + 0.25 * m.x_height;
    let overline = MathBox::rule(inner.width, rule);
    let inner_depth = inner.depth;
    let barred = MathBox::vstack(
        BoxCategory::Ordinary,
        VAlign::Bottom(inner_depth),
        vec![VListChild::elem(overline), VListChild::Kern(clearance), VListChild::elem(inner)],
    );
    let radical = MathBox::glyph(BoxCategory::Open, '√', m);
    Some(MathBox::hstack(BoxCategory::Ordinary, vec![radical, barred]))
}

fn render_accent(tree: &mut Tree, id: NodeId, ctx: &mut RenderContext) -> Option<MathBox> {
    let body = render_branch_box(tree, id, Branch::Body, ctx.math_style.cramp(), ctx)
        .unwrap_or_else(|| MathBox::empty(BoxCategory::Ordinary));
    let accent_char = match tree.node(id).value {
        Some(Value::Symbol(c)) => c,
        _ => '^',
    };
    let m = ctx.metrics;
    let accent = MathBox::glyph(BoxCategory::Ordinary, accent_char, m);

    // The accent hugs the body: it drops down to x-height when the body is
    // short.
    let delta = body.height.min(m.x_height);
    let rise = body.height - delta;
    let margin = (body.width - accent.width) / 2.0;
    Some(MathBox::vstack_individual(
        BoxCategory::Ordinary,
        vec![
            ShiftedBox { content: accent, shift: -(rise + delta), margin_left: margin },
            ShiftedBox { content: body, shift: 0.0, margin_left: 0.0 },
        ],
    ))
}

fn render_enclose(tree: &mut Tree, id: NodeId, ctx: &mut RenderContext) -> Option<MathBox> {
    let body = render_branch_box(tree, id, Branch::Body, ctx.math_style, ctx)
        .unwrap_or_else(|| MathBox::empty(BoxCategory::Ordinary));
    let pad = 3.0 * ctx.metrics.default_rule_thickness;
    let mut result = MathBox::empty(BoxCategory::Ordinary);
    result.height = body.height + pad;
    result.depth = body.depth + pad;
    result.width = body.width + 2.0 * pad;
    result.children.push(crate::render::ChildBox { content: body, dx: pad, dy: 0.0 });
    Some(result)
}

fn render_array(tree: &mut Tree, id: NodeId, ctx: &mut RenderContext) -> Option<MathBox> {
    const COLUMN_GAP: f64 = 0.5;
    const ROW_GAP: f64 = 0.25;

    // Branch order is (row, column) lexicographic, so cells arrive row by
    // row already sorted.
    let cells: Vec<Branch> =
        tree.branch_names(id).into_iter().filter(|b| b.is_cell()).collect();
    if cells.is_empty() {
        return None;
    }

    let mut rows: Vec<Vec<MathBox>> = Vec::new();
    let mut current_row = None;
    for cell in cells {
        let Branch::Cell(row, _) = cell else { unreachable!() };
        if current_row != Some(row) {
            rows.push(Vec::new());
            current_row = Some(row);
        }
        let content = render_branch_box(tree, id, cell, ctx.math_style, ctx)
            .unwrap_or_else(|| MathBox::empty(BoxCategory::Ordinary));
        let last = rows.last_mut().unwrap();
        if !last.is_empty() {
            last.push(MathBox::kern(COLUMN_GAP));
        }
        last.push(content);
    }

    let mut children = Vec::new();
    for (i, row) in rows.into_iter().enumerate() {
        if i > 0 {
            children.push(VListChild::Kern(ROW_GAP));
        }
        children.push(VListChild::elem(MathBox::hstack(BoxCategory::Ordinary, row)));
    }
    let extent: f64 = children
        .iter()
        .map(|c| match c {
            VListChild::Elem { content, .. } => content.height + content.depth,
            VListChild::Kern(k) => *k,
        })
        .sum();
    // Centre the whole block on the math axis.
    let depth = extent / 2.0 - ctx.metrics.axis_height;
    Some(MathBox::vstack(BoxCategory::Inner, VAlign::Bottom(depth), children))
}

/// Renders one branch of a node under a nested style, restoring the
/// context afterwards. The nested run comes back already rescaled to the
/// caller's coordinate scale.
pub(crate) fn render_branch(
    tree: &mut Tree,
    id: NodeId,
    branch: Branch,
    style: MathStyle,
    ctx: &mut RenderContext,
) -> Option<Vec<MathBox>> {
    let nodes: Option<Vec<NodeId>> = tree.branch(id, branch).map(|s| s.to_vec());

    let saved_style = (ctx.math_style, ctx.parent_style);
    let saved_size = (ctx.size, ctx.parent_size);
    let saved_phantom = ctx.phantom_base.take();
    ctx.parent_style = saved_style.0;
    ctx.math_style = style;
    ctx.parent_size = saved_size.0;
    ctx.size = tree.node(id).style.font_size.unwrap_or(saved_size.0);

    let result = render_node_list(tree, nodes.as_deref(), ctx);

    (ctx.math_style, ctx.parent_style) = saved_style;
    (ctx.size, ctx.parent_size) = saved_size;
    ctx.phantom_base = saved_phantom;
    result
}

/// Like [`render_branch`], flattened to one horizontal box. Empty and
/// absent branches both come back as `None` here; script attachment only
/// cares whether there is anything to place.
pub(crate) fn render_branch_box(
    tree: &mut Tree,
    id: NodeId,
    branch: Branch,
    style: MathStyle,
    ctx: &mut RenderContext,
) -> Option<MathBox> {
    let boxes = render_branch(tree, id, branch, style, ctx)?;
    if boxes.is_empty() {
        return None;
    }
    Some(MathBox::hstack(BoxCategory::Ordinary, boxes))
}
