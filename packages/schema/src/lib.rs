//! # Folio Schema
//!
//! Declarative validation for document trees.
//!
//! A [`Schema`] is an ordered list of [`SchemaLayer`]s. Custom layers are
//! consulted first, highest priority first, and the core layer last. The
//! first rule that objects to a node produces a [`Violation`]; repairing it
//! is the editor's job.

pub mod config;
mod error;
pub mod invariants;
mod layer;
mod matcher;
mod rule;
mod schema;
mod violation;

pub use config::{LayerConfig, RuleConfig, SchemaConfig};
pub use error::{SchemaError, SchemaResult};
pub use layer::{SchemaLayer, CORE_LAYER};
pub use matcher::{check_any, DataPredicate, Mismatch, NodeMatcher};
pub use rule::{ChildGroup, Rule, SchemaRule, ValidationContext};
pub use schema::Schema;
pub use violation::{Violation, ViolationCode};
