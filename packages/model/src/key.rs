use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_KEY: AtomicU64 = AtomicU64::new(1);

/// Process-unique, edit-stable node identity.
///
/// Keys survive every operation that keeps a node alive (text edits, moves,
/// property changes), while paths change whenever a sibling or ancestor is
/// restructured. Keys are never reused by [`Key::generate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(u64);

impl Key {
    /// Generate the next sequential key
    pub fn generate() -> Self {
        Key(NEXT_KEY.fetch_add(1, Ordering::Relaxed))
    }

    /// Adopt an externally supplied key (e.g. from serialized JSON).
    ///
    /// The generator is advanced past it so freshly generated keys never
    /// collide with adopted ones.
    pub fn adopt(raw: u64) -> Self {
        NEXT_KEY.fetch_max(raw.saturating_add(1), Ordering::Relaxed);
        Key(raw)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
