//! The geometric box primitive produced by layout.
//!
//! A [`MathBox`] is a rectangle with a baseline: `height` extends above the
//! baseline, `depth` below it, both in em units. Boxes nest; a child is
//! positioned by the offset of its own baseline origin from the parent's.
//! Composition happens through the horizontal and vertical stacking
//! constructors, never by mutating positions after the fact.

use crate::metrics::FontMetrics;

/// The TeX category tag carried by every box, used by the painter for
/// inter-box spacing and by hit-testing to classify targets.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum BoxCategory {
    Ordinary,
    Binary,
    Relation,
    Open,
    Close,
    Punctuation,
    Operator,
    Inner,
    /// Wrapper around a corner sub/superscript pair.
    SupSub,
    /// An operator with its limits stacked above/below.
    OpLimits,
}

/// A positioned child of a box. `dx` is measured from the parent's left
/// edge, `dy` from the parent's baseline, positive downwards.
#[derive(PartialEq, Clone, Debug)]
pub struct ChildBox {
    pub content: MathBox,
    pub dx: f64,
    pub dy: f64,
}

#[derive(PartialEq, Clone, Debug)]
pub struct MathBox {
    pub category: BoxCategory,
    pub height: f64,
    pub depth: f64,
    pub width: f64,
    pub italic: f64,
    /// Glyph content, for leaf boxes.
    pub value: Option<char>,
    pub children: Vec<ChildBox>,
    /// Display identifier assigned during the render pass, used to map a
    /// box back to the tree node that produced it.
    pub id: Option<u64>,
    pub selected: bool,
    pub has_caret: bool,
}

/// One row of a vertical stack built with per-row shifts.
#[derive(PartialEq, Clone, Debug)]
pub struct ShiftedBox {
    pub content: MathBox,
    /// Displacement of this row's baseline below the stack baseline.
    pub shift: f64,
    pub margin_left: f64,
}

/// An element of a vertical list, listed top to bottom.
#[derive(PartialEq, Clone, Debug)]
pub enum VListChild {
    Elem { content: MathBox, margin_left: f64 },
    Kern(f64),
}

impl VListChild {
    pub fn elem(content: MathBox) -> VListChild {
        VListChild::Elem { content, margin_left: 0.0 }
    }

    fn extent(&self) -> f64 {
        match self {
            VListChild::Elem { content, .. } => content.height + content.depth,
            VListChild::Kern(k) => *k,
        }
    }
}

/// How a vertical list is anchored to its baseline.
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum VAlign {
    /// The top edge of the stack sits this far above the baseline.
    Top(f64),
    /// The bottom edge of the stack sits this far below the baseline.
    Bottom(f64),
    /// The baseline of the first (topmost) element sits this far below the
    /// stack baseline.
    Shift(f64),
}

impl MathBox {
    pub fn empty(category: BoxCategory) -> MathBox {
        MathBox {
            category,
            height: 0.0,
            depth: 0.0,
            width: 0.0,
            italic: 0.0,
            value: None,
            children: Vec::new(),
            id: None,
            selected: false,
            has_caret: false,
        }
    }

    /// A leaf box holding one glyph, sized from the metrics table.
    pub fn glyph(category: BoxCategory, c: char, metrics: &FontMetrics) -> MathBox {
        let g = metrics.glyph(c);
        MathBox {
            value: Some(c),
            height: g.height,
            depth: g.depth,
            width: 0.5,
            italic: g.italic,
            ..MathBox::empty(category)
        }
    }

    /// Fixed horizontal space.
    pub fn kern(width: f64) -> MathBox {
        MathBox { width, ..MathBox::empty(BoxCategory::Ordinary) }
    }

    /// A horizontal rule of the given width and thickness, centred on the
    /// baseline.
    pub fn rule(width: f64, thickness: f64) -> MathBox {
        MathBox {
            width,
            height: thickness / 2.0,
            depth: thickness / 2.0,
            ..MathBox::empty(BoxCategory::Ordinary)
        }
    }

    /// Stacks boxes left to right along a shared baseline.
    pub fn hstack(category: BoxCategory, boxes: Vec<MathBox>) -> MathBox {
        let mut result = MathBox::empty(category);
        let mut x = 0.0;
        for b in boxes {
            if b.height > result.height {
                result.height = b.height;
            }
            if b.depth > result.depth {
                result.depth = b.depth;
            }
            let advance = b.width;
            result.children.push(ChildBox { content: b, dx: x, dy: 0.0 });
            x += advance;
        }
        result.width = x;
        debug_assert!(result.height.is_finite() && result.depth.is_finite());
        result
    }

    /// Stacks elements vertically, anchored per `align`. Elements are
    /// listed top to bottom.
    pub fn vstack(category: BoxCategory, align: VAlign, children: Vec<VListChild>) -> MathBox {
        let extent: f64 = children.iter().map(VListChild::extent).sum();

        // Distance from the top edge of the stack down to its baseline.
        let height = match align {
            VAlign::Top(h) => h,
            VAlign::Bottom(d) => extent - d,
            VAlign::Shift(s) => {
                // Leading kerns sit above the first real element.
                let mut lead = 0.0;
                let mut first_height = 0.0;
                for child in &children {
                    match child {
                        VListChild::Kern(k) => lead += k,
                        VListChild::Elem { content, .. } => {
                            first_height = content.height;
                            break;
                        }
                    }
                }
                lead + first_height - s
            }
        };

        let mut result = MathBox::empty(category);
        result.height = height;
        result.depth = extent - height;

        let mut y = -height;
        for child in children {
            match child {
                VListChild::Kern(k) => y += k,
                VListChild::Elem { content, margin_left } => {
                    let dy = y + content.height;
                    y += content.height + content.depth;
                    if margin_left + content.width > result.width {
                        result.width = margin_left + content.width;
                    }
                    result.children.push(ChildBox { content, dx: margin_left, dy });
                }
            }
        }
        debug_assert!(result.height.is_finite() && result.depth.is_finite());
        result
    }

    /// Stacks rows vertically where every row carries its own baseline
    /// shift, independent of the others.
    pub fn vstack_individual(category: BoxCategory, rows: Vec<ShiftedBox>) -> MathBox {
        let mut result = MathBox::empty(category);
        for row in rows {
            let top = row.content.height - row.shift;
            let bottom = row.content.depth + row.shift;
            if top > result.height {
                result.height = top;
            }
            if bottom > result.depth {
                result.depth = bottom;
            }
            if row.margin_left + row.content.width > result.width {
                result.width = row.margin_left + row.content.width;
            }
            result.children.push(ChildBox {
                content: row.content,
                dx: row.margin_left,
                dy: row.shift,
            });
        }
        debug_assert!(result.height.is_finite() && result.depth.is_finite());
        result
    }

    /// Rescales vertical extent by `factor`, recursively. Used to reconcile
    /// dimensions produced under a nested math style with the enclosing
    /// coordinate scale.
    pub fn rescale(&mut self, factor: f64) {
        self.height *= factor;
        self.depth *= factor;
        for child in &mut self.children {
            child.dy *= factor;
            child.content.rescale(factor);
        }
    }
}
