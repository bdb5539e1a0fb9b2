//! # Folio Model
//!
//! Immutable document tree and the coordinate space used to address it.
//!
//! ## Architecture
//!
//! ```text
//! Value
//!  ├── document: Node::Document
//!  │     └── Block / Inline (ordered children)
//!  │           └── Text (leaves: runs of characters tagged with marks)
//!  ├── selection: anchor/focus Points + focus state + pending marks
//!  └── decorations: (Range, Mark) annotations
//! ```
//!
//! Nodes are shared through `Arc`. Editing a node clones only the pointer
//! vectors along the edited path, so old values stay valid and cheap to keep.
//!
//! Paths are ephemeral: they locate a node in one particular tree. Keys are
//! stable across edits and are how callers re-find a node after structure
//! changes.

pub mod builder;
pub mod document;
pub mod error;
pub mod key;
pub mod mark;
pub mod node;
pub mod path;
pub mod plain;
pub mod point;
pub mod range;
pub mod selection;
pub mod serializer;
pub mod text;
pub mod value;
pub mod visitor;

pub use error::{ModelError, ModelResult};
pub use key::Key;
pub use mark::{Data, Mark, MarkSet};
pub use node::{Element, Node, NodeProperties, Object};
pub use path::Path;
pub use point::Point;
pub use range::{Decoration, Range};
pub use selection::Selection;
pub use serializer::{SerializeOptions, Serializer};
pub use text::{Leaf, Text};
pub use value::Value;
pub use visitor::{walk_node, PathCollector, Visitor};
