//! Public AST types for chirp templates and string files.
//!
//! These types are public to enable external tooling (linters, editors, etc.).

/// A parsed template string containing segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
    pub segments: Vec<Segment>,
}

/// A segment within a template.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text.
    Text(String),
    /// A macro: %GROUP:KEY%
    Macro { group: String, key: String },
    /// A reference to another string: $[ID]
    ///
    /// Resolved when the template is built into a tree, not during evaluation.
    Reference(String),
    /// A plugin call: $(NAME=ARGS|SCOPE)
    Plugin {
        name: String,
        args: Option<Vec<Segment>>,
        scope: Option<Vec<Segment>>,
    },
}

/// A string definition as written in a `.strings` file.
#[derive(Debug, Clone, PartialEq)]
pub struct StringDefinition {
    /// String id (e.g., "COMMAND_HELLO").
    pub id: String,
    /// Raw template text with file-level escapes already removed.
    pub template: String,
    /// Text of the `///` comments preceding the definition.
    pub description: Option<String>,
}
