use crate::{Key, Path};
use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("No node at path {0}")]
    PathNotFound(Path),

    #[error("No node with key {0}")]
    KeyNotFound(Key),

    #[error("Node at path {0} is not a text node")]
    NotText(Path),

    #[error("Node at path {0} cannot have children")]
    NotElement(Path),

    #[error("Offset {offset} out of range for text of length {len} at {path}")]
    OffsetOutOfRange { path: Path, offset: usize, len: usize },

    #[error("Invalid document JSON: {0}")]
    Deserialize(String),
}

impl ModelError {
    pub fn offset_out_of_range(path: &Path, offset: usize, len: usize) -> Self {
        Self::OffsetOutOfRange {
            path: path.clone(),
            offset,
            len,
        }
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(e: serde_json::Error) -> Self {
        ModelError::Deserialize(e.to_string())
    }
}
