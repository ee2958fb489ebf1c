//! Miette diagnostic wrapper for chirp string file errors.
//!
//! Note: This module has an exception for `unused_assignments` because miette
//! derive macros read struct fields in generated code that rustc cannot track.
#![allow(unused_assignments)]

use std::path::Path;

use chirp::parser::ParseError;
use chirp::ErrorCode;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// A miette-compatible diagnostic pointing into a string file.
///
/// Note: Fields are read by miette derive macros, not directly by code.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(chirp::strings))]
pub struct ChirpDiagnostic {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: SourceSpan,

    message: String,

    #[help]
    help: Option<String>,
}

impl ChirpDiagnostic {
    /// Create a diagnostic from a ParseError with source context.
    pub fn from_parse_error(path: &Path, content: &str, err: &ParseError) -> Self {
        let (line, column, message) = match err {
            ParseError::Syntax {
                line,
                column,
                message,
            } => (*line, *column, format!("syntax error: {message}")),
            ParseError::UnexpectedEof { line, column } => {
                (*line, *column, "unexpected end of file".into())
            }
        };

        // Convert line:column to byte offset.
        let offset = content
            .lines()
            .take(line.saturating_sub(1))
            .map(|l| l.len() + 1)
            .sum::<usize>()
            + column.saturating_sub(1);

        // Clamp offset to content length to avoid miette panic on out-of-bounds
        let offset = offset.min(content.len());

        ChirpDiagnostic {
            src: NamedSource::new(path.display().to_string(), content.to_string()),
            span: (offset, 1).into(),
            message,
            help: None,
        }
    }

    /// Create a diagnostic for the string `id`, labelling its definition.
    pub fn at_string(
        path: &Path,
        content: &str,
        id: &str,
        message: String,
        help: Option<String>,
    ) -> Self {
        ChirpDiagnostic {
            src: NamedSource::new(path.display().to_string(), content.to_string()),
            span: definition_span(content, id),
            message,
            help,
        }
    }
}

/// Hint for fixing a template error with the given code.
pub fn help_for(code: ErrorCode) -> Option<String> {
    let help = match code {
        ErrorCode::NoChildren => "parentheses inside plugin args and scope must be balanced or escaped as \\( and \\)",
        ErrorCode::NoPluginName => "plugin tokens look like $(NAME), $(NAME=args) or $(NAME=args|scope)",
        ErrorCode::NoPluginContent | ErrorCode::NoPluginContentAndValue => {
            "drop the '=' or '|' of an empty plugin part"
        }
        ErrorCode::NoContent => "macros look like %GROUP:KEY% and references like $[ID]",
        ErrorCode::StringNotFound => "define the referenced string or fix the reference id",
        ErrorCode::ReferenceCycle => "a string cannot reference itself, directly or through others",
        _ => return None,
    };
    Some(help.to_string())
}

/// Find the id of the definition of `id` in a string file.
fn definition_span(content: &str, id: &str) -> SourceSpan {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();
        let is_definition = trimmed.strip_prefix(id).is_some_and(|rest| {
            rest.starts_with(|c: char| c.is_whitespace() || c == '=')
        });
        if is_definition {
            return (offset + indent, id.len()).into();
        }
        offset += line.len();
    }
    (0, 0).into()
}
