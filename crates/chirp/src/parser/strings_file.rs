//! String file format parser.
//!
//! Parses `.strings` files containing string definitions:
//!
//! ```text
//! // A plain comment
//! /// Reply to !hello (becomes the description)
//! COMMAND_HELLO = "Hello $(USER)!";
//! ```

use winnow::combinator::{alt, delimited, not, preceded, repeat, terminated};
use winnow::prelude::*;
use winnow::token::{none_of, take_while};

use super::ast::StringDefinition;
use super::calculate_position;
use super::error::ParseError;

/// Parse an entire `.strings` file into string definitions.
pub fn parse_strings_file(input: &str) -> Result<Vec<StringDefinition>, ParseError> {
    let mut remaining = input;
    match file(&mut remaining) {
        Ok(definitions) => {
            if remaining.is_empty() {
                Ok(definitions)
            } else {
                let (line, column) = calculate_position(input, remaining);
                Err(ParseError::Syntax {
                    line,
                    column,
                    message: format!(
                        "unexpected character: '{}'",
                        remaining.chars().next().unwrap_or('?')
                    ),
                })
            }
        }
        Err(e) => {
            let (line, column) = calculate_position(input, remaining);
            if remaining.is_empty() {
                Err(ParseError::UnexpectedEof { line, column })
            } else {
                Err(ParseError::Syntax {
                    line,
                    column,
                    message: format!("parse error: {}", e),
                })
            }
        }
    }
}

/// Parse an entire file into string definitions.
fn file(input: &mut &str) -> ModalResult<Vec<StringDefinition>> {
    skip_ws_and_comments(input)?;
    let definitions: Vec<StringDefinition> =
        repeat(0.., terminated(string_definition, skip_ws_and_comments)).parse_next(input)?;
    Ok(definitions)
}

/// Skip whitespace and plain line comments. Doc comments are left in place.
fn skip_ws_and_comments(input: &mut &str) -> ModalResult<()> {
    let _: Vec<()> = repeat(0.., alt((ws_only.void(), line_comment.void()))).parse_next(input)?;
    Ok(())
}

/// Parse whitespace (no comments).
fn ws_only<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_ascii_whitespace()).parse_next(input)
}

/// Parse a plain line comment: // ... newline
fn line_comment<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    preceded(("//", not('/')), take_while(0.., |c| c != '\n')).parse_next(input)
}

/// Parse a doc comment line: /// ... newline
fn doc_comment<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    preceded("///", take_while(0.., |c| c != '\n'))
        .map(str::trim)
        .parse_next(input)
}

/// Parse a string definition: docs? ID = "template" ;
fn string_definition(input: &mut &str) -> ModalResult<StringDefinition> {
    let docs: Vec<&str> =
        repeat(0.., terminated(doc_comment, skip_ws_and_comments)).parse_next(input)?;
    let id = identifier(input)?;
    skip_ws_and_comments(input)?;
    '='.parse_next(input)?;
    skip_ws_and_comments(input)?;
    let template = quoted(input)?;
    skip_ws_and_comments(input)?;
    ';'.parse_next(input)?;

    let description = if docs.is_empty() {
        None
    } else {
        Some(docs.join(" "))
    };

    Ok(StringDefinition {
        id: id.to_string(),
        template,
        description,
    })
}

/// Parse a string id (alphanumeric + underscore).
fn identifier<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)
}

/// Parse a quoted template: "content"
///
/// Only `\"` and `\\` are unescaped here. Every other backslash is kept so
/// template escapes such as `\(` reach the template parser unchanged.
fn quoted(input: &mut &str) -> ModalResult<String> {
    delimited(
        '"',
        repeat(
            0..,
            alt(("\\\"".value('"'), "\\\\".value('\\'), none_of(['"']))),
        ),
        '"',
    )
    .parse_next(input)
}
