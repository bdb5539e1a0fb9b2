//! # Folio Editor
//!
//! Editing engine for folio documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: Value, Node tree, Path/Point/Range   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Change + commands                   │
//! │  - Commands emit invertible Operations      │
//! │  - Each operation is applied immediately    │
//! │  - Selection and decorations are transformed│
//! │  - Dirty nodes are normalized against the   │
//! │    Schema when the outermost command ends   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ Editor: commit → History (undo/redo)        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Operations are the only way to edit**: every command reduces to
//!    operations, and every operation has an exact inverse
//! 2. **Values are snapshots**: applying an operation produces a new tree
//!    sharing unchanged nodes with the old one
//! 3. **Changes are explicit**: a [`Change`] is an owned transaction, not
//!    ambient state
//! 4. **Normalization is local**: only nodes an operation touched are checked
//!
//! ## Usage
//!
//! ```rust,ignore
//! use folio_editor::Editor;
//! use folio_model::plain;
//!
//! let mut editor = Editor::new(plain::deserialize("hello\nworld", "paragraph"));
//! editor.edit(|change| {
//!     change.select_all()?;
//!     change.delete()
//! })?;
//! editor.undo()?;
//! ```

mod apply;
pub mod change;
mod commands;
pub mod config;
pub mod editor;
pub mod errors;
pub mod history;
pub mod normalizer;
pub mod operation;
pub mod plugin;
pub mod transform;

pub use apply::apply_operation;
pub use change::{Change, DEFAULT_BLOCK};
pub use config::{EditorConfig, HistoryConfig, NormalizeConfig, DEFAULT_CONFIG_NAME};
pub use editor::Editor;
pub use errors::{EditorError, EditorResult, OperationError, OperationResult};
pub use history::{should_merge, Batch, History};
pub use normalizer::{default_repair, NormalizeHook, Normalizer, DEFAULT_ITERATION_BASE};
pub use operation::Operation;
pub use plugin::Plugin;
pub use transform::{transform_path, transform_point, transform_range, transform_selection};
