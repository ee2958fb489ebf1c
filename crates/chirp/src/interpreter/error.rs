//! Error types for the chirp engine.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of error codes raised while building or evaluating a template.
///
/// Every [`TemplateError`] maps to exactly one code, so callers can branch on
/// the kind of failure without matching on message text.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A token had no textual content where some was required.
    NoContent,
    /// A plugin argument or scope was never closed.
    NoChildren,
    /// A plugin token had an empty name.
    NoPluginName,
    /// Plugin args or scope markers were present but empty, or the token never closed.
    NoPluginContent,
    /// Both the args and the scope marker of a plugin were present but empty.
    NoPluginContentAndValue,
    /// A referenced string id does not exist in the string table.
    StringNotFound,
    /// A chain of references leads back to itself.
    ReferenceCycle,
    /// A macro group or key is missing from the macro map.
    MacroNotFound,
    /// A macro-generating plugin failed.
    MacroError,
    /// A plugin name is missing from the plugin map.
    PluginNotFound,
    /// A plugin failed.
    PluginError,
}

impl ErrorCode {
    /// Returns the stable upper-case name of this code.
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NoContent => "NO_CONTENT",
            ErrorCode::NoChildren => "NO_CHILDREN",
            ErrorCode::NoPluginName => "NO_PLUGIN_NAME",
            ErrorCode::NoPluginContent => "NO_PLUGIN_CONTENT",
            ErrorCode::NoPluginContentAndValue => "NO_PLUGIN_CONTENT_AND_VALUE",
            ErrorCode::StringNotFound => "STRING_NOT_FOUND",
            ErrorCode::ReferenceCycle => "REFERENCE_CYCLE",
            ErrorCode::MacroNotFound => "MACRO_NOT_FOUND",
            ErrorCode::MacroError => "MACRO_ERROR",
            ErrorCode::PluginNotFound => "PLUGIN_NOT_FOUND",
            ErrorCode::PluginError => "PLUGIN_ERROR",
        }
    }

    /// Parses a code from its upper-case name.
    pub fn from_name(name: &str) -> Option<ErrorCode> {
        [
            ErrorCode::NoContent,
            ErrorCode::NoChildren,
            ErrorCode::NoPluginName,
            ErrorCode::NoPluginContent,
            ErrorCode::NoPluginContentAndValue,
            ErrorCode::StringNotFound,
            ErrorCode::ReferenceCycle,
            ErrorCode::MacroNotFound,
            ErrorCode::MacroError,
            ErrorCode::PluginNotFound,
            ErrorCode::PluginError,
        ]
        .into_iter()
        .find(|code| code.as_str() == name)
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// An error raised while building or evaluating a template.
///
/// Syntax, reference and cycle errors come from the build phase and are
/// raised before any plugin is invoked. The remaining variants come from
/// evaluation and abort it without producing partial output.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template text is malformed.
    #[error("{code} at {line}:{column}: {message}")]
    Syntax {
        code: ErrorCode,
        line: usize,
        column: usize,
        message: String,
    },

    /// A reference or lookup named a string id that does not exist.
    #[error("string not found: '{id}'{}", format_suggestions(suggestions))]
    StringNotFound { id: String, suggestions: Vec<String> },

    /// A reference chain revisits an id that is still being expanded.
    #[error("cyclic string reference: {}", chain.join(" -> "))]
    ReferenceCycle { chain: Vec<String> },

    /// A macro group or key is not present in the macro map.
    #[error("macro not found: '%{group}:{key}%'{}", format_suggestions(suggestions))]
    MacroNotFound {
        group: String,
        key: String,
        suggestions: Vec<String>,
    },

    /// A plugin invoked to generate macros for its scope failed.
    #[error("macro plugin '{plugin}' failed: {message}")]
    MacroError { plugin: String, message: String },

    /// A plugin name is not present in the plugin map.
    #[error("plugin not found: '{name}'{}", format_suggestions(suggestions))]
    PluginNotFound { name: String, suggestions: Vec<String> },

    /// A plugin returned an error.
    #[error("plugin '{name}' failed: {message}")]
    PluginError { name: String, message: String },
}

impl TemplateError {
    /// Returns the error code of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            TemplateError::Syntax { code, .. } => *code,
            TemplateError::StringNotFound { .. } => ErrorCode::StringNotFound,
            TemplateError::ReferenceCycle { .. } => ErrorCode::ReferenceCycle,
            TemplateError::MacroNotFound { .. } => ErrorCode::MacroNotFound,
            TemplateError::MacroError { .. } => ErrorCode::MacroError,
            TemplateError::PluginNotFound { .. } => ErrorCode::PluginNotFound,
            TemplateError::PluginError { .. } => ErrorCode::PluginError,
        }
    }

    /// Returns true if this error was raised before evaluation started.
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            TemplateError::Syntax { .. }
                | TemplateError::StringNotFound { .. }
                | TemplateError::ReferenceCycle { .. }
        )
    }
}

/// Errors raised while constructing a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The same id was registered twice.
    #[error("duplicate {registry} id '{id}'")]
    DuplicateId { registry: &'static str, id: String },

    /// A string table entry does not parse.
    #[error("invalid template for string '{id}': {source}")]
    InvalidTemplate {
        id: String,
        #[source]
        source: TemplateError,
    },

    /// An override was supplied for an id that has no default entry.
    #[error("override for unknown string '{id}'{}", format_suggestions(suggestions))]
    UnknownOverride { id: String, suggestions: Vec<String> },
}

/// Errors that occur while loading a string file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File I/O error when reading a string file.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Syntax error in the string file.
    #[error("{path}:{line}:{column}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// The entries were read but do not form a valid table.
    #[error("{path}: {source}")]
    Registry {
        path: PathBuf,
        #[source]
        source: RegistryError,
    },
}

/// Computes up to three ids from `available` that are close to `key`.
///
/// Closest matches come first. Keys of up to three characters accept an
/// edit distance of one, longer keys an edit distance of two.
pub fn compute_suggestions(key: &str, available: &[String]) -> Vec<String> {
    let max_distance = if key.chars().count() <= 3 { 1 } else { 2 };
    let mut scored: Vec<(usize, &String)> = available
        .iter()
        .map(|candidate| (strsim::levenshtein(key, candidate), candidate))
        .filter(|(distance, _)| *distance <= max_distance)
        .collect();
    scored.sort();
    scored
        .into_iter()
        .take(3)
        .map(|(_, candidate)| candidate.clone())
        .collect()
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}
