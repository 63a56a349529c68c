//! Tree model: node kinds, styles, and the arena-backed expression tree.

pub mod kind;
pub mod style;
pub mod tree;

pub use kind::{Kind, KindDescriptor, KindTable, Limits, Mode, ScriptsMode};
pub use style::{FontSeries, FontShape, Style};
pub use tree::{Branch, Node, NodeId, Tree, Value};
