use thiserror::Error;

pub type Result<T> = core::result::Result<T, TreeError>;

/// Contract violations on the tree mutation API. These are all caller
/// mistakes; the tree is left untouched when one is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    #[error("branch content must not begin with a sentinel node")]
    SentinelInContent,

    #[error("anchor node is not attached to a branch")]
    NotASibling,

    #[error("node is not a child of any parent")]
    NotAChild,
}
