//! Parse error types for string files.

use thiserror::Error;

/// An error that occurred while parsing a `.strings` file.
///
/// Template syntax errors are reported as
/// [`TemplateError::Syntax`](crate::TemplateError::Syntax) instead, since
/// callers branch on their error code.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A syntax error with location information.
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// Unexpected end of input.
    #[error("unexpected end of input at {line}:{column}")]
    UnexpectedEof { line: usize, column: usize },
}
