//! chirp interpreter for building and evaluating templates.
//!
//! This module provides the string table, the builder that turns template
//! ASTs into trees with references expanded, and the evaluator that turns
//! trees into replies by substituting macros and calling plugins.

mod builder;
mod context;
mod engine;
mod error;
mod evaluator;
mod registry;
mod tree;

pub use builder::{build, build_by_id};
pub use context::BuildContext;
pub use engine::{Engine, build_template, parse, parse_by_id};
pub use error::{ErrorCode, LoadError, RegistryError, TemplateError, compute_suggestions};
pub use evaluator::{MacroScope, eval_nodes, evaluate};
pub use registry::StringTable;
pub use tree::{Node, ParseTree};
