//! Box-and-glue typesetting core for mathematical expression trees.
//!
//! An expression is a [`Tree`] of semantic units, each owning named child
//! branches (`above`, `body`, `below`, `superscript`, `subscript`) or
//! tabular cells. The layout engine turns a run of sibling nodes into
//! positioned [`MathBox`]es following the TeX box model, with the TeXbook
//! sub/superscript and big-operator limits rules; the serializer maps the
//! same tree back to canonical markup. Parsing, painting and interactive
//! editing live outside this crate.

pub mod error;
pub mod layout;
pub mod metrics;
pub mod node;
pub mod render;
pub mod serialize;

#[cfg(test)]
mod tests;

pub use crate::{
    error::{Result, TreeError},
    layout::{render_node_list, IdGenerator, RenderContext},
    metrics::{FontMetrics, MathStyle},
    node::{Branch, Kind, KindDescriptor, KindTable, Limits, Mode, Node, NodeId, Style, Tree, Value},
    render::{BoxCategory, MathBox},
    serialize::{serialize_list, serialize_node, SerializeOptions},
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
