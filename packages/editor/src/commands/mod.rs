//! # Commands
//!
//! Everything here is an `impl Change` block. Commands read the current
//! value, build operations against it and apply them one at a time, so a
//! command that calls other commands always sees their effect.
//!
//! ## Layers
//!
//! - **by_path**: one or a few operations addressed by path or key. The
//!   normalizer repairs through these.
//! - **text**: insertion and deletion at the selection, including joins
//!   across blocks.
//! - **structure**: splitting, wrapping and unwrapping blocks and inlines.
//! - **marks**: formatting over the selection, or pending marks when it is
//!   collapsed.
//! - **selection**: cursor placement. Selection commands never touch the
//!   document.
//!
//! Every public command runs inside [`Change::command`](crate::Change::command),
//! so the touched nodes are normalized when the outermost one returns.

mod by_path;
mod marks;
mod selection;
mod structure;
mod text;
