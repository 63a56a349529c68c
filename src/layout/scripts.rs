//! Sub/superscript attachment: the corner rules of TeXbook appendix G
//! (18a-f) and the big-operator limits stack (13a).

use crate::metrics::{FontMetrics, MathStyle};
use crate::node::{Branch, NodeId, Tree};
use crate::render::{BoxCategory, MathBox, ShiftedBox, VAlign, VListChild};

use super::{render_branch_box, RenderContext};

/// Baseline displacements for a corner script pair: `sup` is measured
/// upward from the nucleus baseline, `sub` downward.
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct ScriptShifts {
    pub sup: f64,
    pub sub: f64,
}

/// Computes corner script shifts from box extents alone. Pure: re-running
/// on the same inputs gives bit-identical results.
///
/// `sup` and `sub` are the (height, depth) of the rendered script boxes,
/// already scaled to the nucleus coordinate system.
pub fn script_shifts(
    metrics: &FontMetrics,
    style: MathStyle,
    nucleus_height: f64,
    nucleus_depth: f64,
    nucleus_is_character_box: bool,
    sup: Option<(f64, f64)>,
    sub: Option<(f64, f64)>,
) -> ScriptShifts {
    // Rule 18a: a character-box nucleus starts from zero; anything else
    // starts from the nucleus extent less the drop metrics.
    let (mut sup_shift, mut sub_shift) = if nucleus_is_character_box {
        (0.0, 0.0)
    } else {
        (nucleus_height - metrics.sup_drop, nucleus_depth + metrics.sub_drop)
    };

    let minimum_sup = if style.is_display() {
        metrics.sup1
    } else if style.is_cramped() {
        metrics.sup3
    } else {
        metrics.sup2
    };

    match (sup, sub) {
        // Rule 18e: both scripts.
        (Some((_, sup_depth)), Some((sub_height, _))) => {
            sup_shift =
                sup_shift.max(minimum_sup).max(sup_depth + 0.25 * metrics.x_height);
            sub_shift = sub_shift.max(metrics.sub2);

            let gap_min = 4.0 * metrics.default_rule_thickness;
            let gap = (sup_shift - sup_depth) - (sub_height - sub_shift);
            if gap < gap_min {
                // Push the subscript down until the gap is exactly met,
                // then hug the superscript back up toward the x-height,
                // carrying the subscript with it to keep the gap.
                sub_shift = gap_min - (sup_shift - sup_depth) + sub_height;
                let psi = 0.8 * metrics.x_height - (sup_shift - sup_depth);
                if psi > 0.0 {
                    sup_shift += psi;
                    sub_shift -= psi;
                }
            }
        }

        // Rule 18b: subscript only.
        (None, Some((sub_height, _))) => {
            sub_shift = sub_shift
                .max(metrics.sub1)
                .max(sub_height - 0.8 * metrics.x_height);
        }

        // Rules 18c/d: superscript only.
        (Some((_, sup_depth)), None) => {
            sup_shift =
                sup_shift.max(minimum_sup).max(sup_depth + 0.25 * metrics.x_height);
        }

        (None, None) => {}
    }

    ScriptShifts { sup: sup_shift, sub: sub_shift }
}

/// Attaches corner scripts to a nucleus. Returns the nucleus unchanged if
/// both script branches are empty. With scripts, the result is a pair
/// [nucleus, script wrapper] re-tagged with the nucleus's category; a caret
/// on the owning node lands on the wrapper so it visually follows the
/// scripts.
pub(crate) fn attach_scripts(
    tree: &mut Tree,
    id: NodeId,
    nucleus: MathBox,
    ctx: &mut RenderContext,
) -> MathBox {
    let sup = render_branch_box(tree, id, Branch::Superscript, ctx.math_style.sup(), ctx);
    let sub = render_branch_box(tree, id, Branch::Subscript, ctx.math_style.sub(), ctx);
    let has_caret = tree.node(id).has_caret;

    if sup.is_none() && sub.is_none() {
        let mut nucleus = nucleus;
        nucleus.has_caret = has_caret;
        return nucleus;
    }

    let both = sup.is_some() && sub.is_some();
    let shifts = script_shifts(
        ctx.metrics,
        ctx.math_style,
        nucleus.height,
        nucleus.depth,
        tree.is_character_box(id),
        sup.as_ref().map(|b| (b.height, b.depth)),
        sub.as_ref().map(|b| (b.height, b.depth)),
    );

    let mut rows = Vec::new();
    if let Some(sup_box) = sup {
        rows.push(ShiftedBox { content: sup_box, shift: -shifts.sup, margin_left: 0.0 });
    }
    if let Some(sub_box) = sub {
        // An extensible nucleus leans; pull the subscript row back under
        // it. A plain character-box nucleus does the same when the
        // subscript stands alone.
        let undo_lean = if both {
            tree.node(id).is_extensible_symbol
        } else {
            tree.is_character_box(id)
        };
        let margin_left = if undo_lean { -nucleus.italic } else { 0.0 };
        rows.push(ShiftedBox { content: sub_box, shift: shifts.sub, margin_left });
    }

    let mut wrapper = MathBox::vstack_individual(BoxCategory::SupSub, rows);
    wrapper.width += ctx.metrics.script_space;
    wrapper.has_caret = has_caret;

    let category = nucleus.category;
    MathBox::hstack(category, vec![nucleus, wrapper])
}

/// Stacks limits above/below a big-operator nucleus, keeping the nucleus
/// baseline fixed. Slanted operators get opposite horizontal offsets on
/// the two limit rows, approximating half-slant centring.
pub(crate) fn attach_limits(
    tree: &mut Tree,
    id: NodeId,
    nucleus: MathBox,
    ctx: &mut RenderContext,
) -> MathBox {
    let above = render_branch_box(tree, id, Branch::Superscript, ctx.math_style.sup(), ctx);
    let below = render_branch_box(tree, id, Branch::Subscript, ctx.math_style.sub(), ctx);
    let has_caret = tree.node(id).has_caret;
    let m = ctx.metrics;
    let slant = nucleus.italic;

    let mut result = match (above, below) {
        (None, None) => {
            let mut nucleus = nucleus;
            nucleus.has_caret = has_caret;
            return nucleus;
        }

        (Some(above), Some(below)) => {
            let above_gap = m.big_op_spacing1.max(m.big_op_spacing3 - above.depth);
            let below_gap = m.big_op_spacing2.max(m.big_op_spacing4 - below.height);
            let bottom = m.big_op_spacing5
                + below.height
                + below.depth
                + below_gap
                + nucleus.depth;
            MathBox::vstack(
                BoxCategory::OpLimits,
                VAlign::Bottom(bottom),
                vec![
                    VListChild::Kern(m.big_op_spacing5),
                    VListChild::Elem { content: above, margin_left: slant },
                    VListChild::Kern(above_gap),
                    VListChild::elem(nucleus),
                    VListChild::Kern(below_gap),
                    VListChild::Elem { content: below, margin_left: -slant },
                    VListChild::Kern(m.big_op_spacing5),
                ],
            )
        }

        (Some(above), None) => {
            let above_gap = m.big_op_spacing1.max(m.big_op_spacing3 - above.depth);
            let bottom = nucleus.depth;
            MathBox::vstack(
                BoxCategory::OpLimits,
                VAlign::Bottom(bottom),
                vec![
                    VListChild::Kern(m.big_op_spacing5),
                    VListChild::Elem { content: above, margin_left: slant },
                    VListChild::Kern(above_gap),
                    VListChild::elem(nucleus),
                ],
            )
        }

        (None, Some(below)) => {
            let below_gap = m.big_op_spacing2.max(m.big_op_spacing4 - below.height);
            let bottom = m.big_op_spacing5
                + below.height
                + below.depth
                + below_gap
                + nucleus.depth;
            MathBox::vstack(
                BoxCategory::OpLimits,
                VAlign::Bottom(bottom),
                vec![
                    VListChild::elem(nucleus),
                    VListChild::Kern(below_gap),
                    VListChild::Elem { content: below, margin_left: -slant },
                    VListChild::Kern(m.big_op_spacing5),
                ],
            )
        }
    };

    result.has_caret = has_caret;
    result
}
