//! Errors raised while applying operations and running changes

use folio_model::{Key, ModelError, Path};
use thiserror::Error;

pub type OperationResult<T> = Result<T, OperationError>;
pub type EditorResult<T> = Result<T, EditorError>;

/// An operation that cannot be applied to the value it was given.
///
/// These are programmer errors: commands only build operations against the
/// tree they read, so hitting one means the caller mixed up values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperationError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Operation cannot target the document root")]
    RootTarget,

    #[error("Index {index} out of range under {parent} ({len} children)")]
    IndexOutOfRange { parent: Path, index: usize, len: usize },

    #[error("Text at {path} does not contain {expected:?} at offset {offset}")]
    TextMismatch {
        path: Path,
        offset: usize,
        expected: String,
    },

    #[error("Cannot merge {path} into its previous sibling: {reason}")]
    InvalidMerge { path: Path, reason: String },

    #[error("Cannot split {path} at {position}")]
    InvalidSplit { path: Path, position: usize },

    #[error("Cannot move {path} into itself at {new_path}")]
    InvalidMove { path: Path, new_path: Path },

    #[error("Cannot insert a {object} node")]
    InvalidNode { object: &'static str },

    /// The operation's undo data disagrees with the tree it is applied to
    #[error("{kind} at {path} does not match the document: {reason}")]
    InvalidPayload {
        kind: &'static str,
        path: Path,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Operation error: {0}")]
    Operation(#[from] OperationError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Schema error: {0}")]
    Schema(#[from] folio_schema::SchemaError),

    /// The schema keeps reporting violations on a node after every repair.
    /// This points at conflicting rules, not at a bad edit.
    #[error("Normalization of {node_type} node {key} did not settle after {iterations} repairs")]
    NormalizationLimit {
        key: Key,
        node_type: String,
        iterations: usize,
    },

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EditorError {
    pub fn is_normalization_limit(&self) -> bool {
        matches!(self, EditorError::NormalizationLimit { .. })
    }
}
