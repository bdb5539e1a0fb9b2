use crate::Path;
use serde::{Deserialize, Serialize};

/// Character position inside a text leaf.
///
/// Points order by path first, then by offset, which is document order
/// because only text leaves are addressed with offsets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: impl Into<Path>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }

    pub fn with_offset(&self, offset: usize) -> Self {
        Self {
            path: self.path.clone(),
            offset,
        }
    }

    pub fn is_before(&self, other: &Point) -> bool {
        self < other
    }

    pub fn is_after(&self, other: &Point) -> bool {
        self > other
    }

    pub fn is_at_start(&self) -> bool {
        self.offset == 0
    }
}
