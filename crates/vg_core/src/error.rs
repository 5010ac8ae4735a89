//! Core error types

use thiserror::Error;

/// Errors raised by path editing and node tree operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VgError {
    /// An index argument was outside the valid range
    #[error("{what} index {index} out of range (count is {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// The node id does not refer to a live node
    #[error("unknown node")]
    UnknownNode,

    /// The operation needs a path node
    #[error("node '{0}' is not a path node")]
    NotAPath(String),

    /// A property value could not be interpreted
    #[error("invalid value '{value}' for property '{property}'")]
    InvalidValue { property: String, value: String },

    /// A node would become its own ancestor
    #[error("cannot attach a node below itself")]
    Cycle,

    /// Rendering failed
    #[error("render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, VgError>;
