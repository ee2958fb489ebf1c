//! Template string parser using winnow.
//!
//! Parses chirp template strings into an AST. Handles:
//! - Literal text segments
//! - Macros: %GROUP:KEY%
//! - References: $[ID]
//! - Plugin calls with optional args and scope: $(NAME=ARGS|SCOPE)
//! - Escaped parentheses inside args and scope: \( \)

use winnow::combinator::{cut_err, fail, opt, preceded};
use winnow::error::{ContextError, ErrMode, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, take_till, take_while};

use super::ast::{Segment, Template};
use super::calculate_position;
use crate::interpreter::{ErrorCode, TemplateError};

/// Nesting level a run of segments is parsed at.
///
/// The level decides which characters end the run and whether parentheses
/// are significant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Level {
    /// Top level of a template. Parentheses and backslashes are plain text.
    Root,
    /// Plugin args, ended by `|` or `)`.
    Args,
    /// Plugin scope, ended by `)`.
    Scope,
    /// Parenthesized text inside args or scope, ended by `)`.
    Group,
}

/// Parse a template string into an AST.
pub fn parse_template(input: &str) -> Result<Template, TemplateError> {
    let mut remaining = input;
    match segments(&mut remaining, Level::Root) {
        Ok(segments) if remaining.is_empty() => Ok(Template { segments }),
        Ok(_) => {
            let (line, column) = calculate_position(input, remaining);
            Err(TemplateError::Syntax {
                code: ErrorCode::NoContent,
                line,
                column,
                message: format!(
                    "unexpected character: '{}'",
                    remaining.chars().next().unwrap_or('?')
                ),
            })
        }
        Err(e) => {
            let (line, column) = calculate_position(input, remaining);
            let (code, message) = describe(e);
            Err(TemplateError::Syntax {
                code,
                line,
                column,
                message,
            })
        }
    }
}

/// Extract the error code and detail attached by [`reject`].
fn describe(error: ErrMode<ContextError>) -> (ErrorCode, String) {
    let (ErrMode::Backtrack(error) | ErrMode::Cut(error)) = error else {
        return (ErrorCode::NoContent, "incomplete input".to_string());
    };
    let mut code = ErrorCode::NoContent;
    let mut message = None;
    for context in error.context() {
        match context {
            StrContext::Label(label) => {
                if let Some(found) = ErrorCode::from_name(label) {
                    code = found;
                }
            }
            StrContext::Expected(StrContextValue::Description(detail)) => {
                message = Some((*detail).to_string());
            }
            _ => {}
        }
    }
    (
        code,
        message.unwrap_or_else(|| "malformed template".to_string()),
    )
}

/// Fail without backtracking, tagging the error with `code` and `detail`.
fn reject<O>(input: &mut &str, code: ErrorCode, detail: &'static str) -> ModalResult<O> {
    cut_err(fail)
        .context(StrContext::Label(code.as_str()))
        .context(StrContext::Expected(StrContextValue::Description(detail)))
        .parse_next(input)
}

/// Parse segments until the end of input or the end of the current level.
fn segments(input: &mut &str, level: Level) -> ModalResult<Vec<Segment>> {
    let mut segments = Vec::new();
    while !input.is_empty() && !at_boundary(input, level) {
        if level != Level::Root && input.starts_with('(') {
            group(input, &mut segments)?;
        } else {
            segments.push(segment(input, level)?);
        }
    }
    Ok(merge_text(segments))
}

/// Check whether the input starts with a character that closes `level`.
fn at_boundary(input: &str, level: Level) -> bool {
    match level {
        Level::Root => false,
        Level::Args => input.starts_with(')') || input.starts_with('|'),
        Level::Scope | Level::Group => input.starts_with(')'),
    }
}

/// Merge adjacent Text segments into single segments.
fn merge_text(segments: Vec<Segment>) -> Vec<Segment> {
    let mut result = Vec::with_capacity(segments.len());

    for segment in segments {
        match segment {
            Segment::Text(text) => {
                if let Some(Segment::Text(prev)) = result.last_mut() {
                    prev.push_str(&text);
                } else {
                    result.push(Segment::Text(text));
                }
            }
            other => result.push(other),
        }
    }

    result
}

/// Parse a single segment (macro, reference, plugin, escape, or text).
fn segment(input: &mut &str, level: Level) -> ModalResult<Segment> {
    if input.starts_with('%') {
        macro_token(input)
    } else if input.starts_with("$[") {
        reference(input)
    } else if input.starts_with("$(") {
        plugin(input)
    } else if level != Level::Root && (input.starts_with("\\(") || input.starts_with("\\)")) {
        escaped_paren(input)
    } else {
        text(input, level)
    }
}

/// Parse a run of plain text.
///
/// A special character that does not start a token is taken as text on its
/// own, e.g. a `$` that is not followed by `[` or `(`.
fn text(input: &mut &str, level: Level) -> ModalResult<Segment> {
    let run: &str = take_till(0.., move |c: char| is_special(c, level)).parse_next(input)?;
    if !run.is_empty() {
        return Ok(Segment::Text(run.to_string()));
    }
    any.map(|c: char| Segment::Text(c.to_string()))
        .parse_next(input)
}

/// Check if a character may start a token or end a level.
fn is_special(c: char, level: Level) -> bool {
    match level {
        Level::Root => matches!(c, '%' | '$'),
        Level::Args => matches!(c, '%' | '$' | '\\' | '(' | ')' | '|'),
        Level::Scope | Level::Group => matches!(c, '%' | '$' | '\\' | '(' | ')'),
    }
}

/// Parse an escaped parenthesis: \( -> (, \) -> )
fn escaped_paren(input: &mut &str) -> ModalResult<Segment> {
    preceded('\\', any)
        .map(|c: char| Segment::Text(c.to_string()))
        .parse_next(input)
}

/// Parse a parenthesized group inside args or scope, keeping the parentheses as text.
fn group(input: &mut &str, out: &mut Vec<Segment>) -> ModalResult<()> {
    '('.parse_next(input)?;
    let inner = segments(input, Level::Group)?;
    if opt(')').parse_next(input)?.is_none() {
        return reject(input, ErrorCode::NoChildren, "parenthesis is never closed");
    }
    out.push(Segment::Text("(".to_string()));
    out.extend(inner);
    out.push(Segment::Text(")".to_string()));
    Ok(())
}

/// Parse a macro: %GROUP:KEY%
fn macro_token(input: &mut &str) -> ModalResult<Segment> {
    '%'.parse_next(input)?;
    let group = take_while(0.., is_name_char).parse_next(input)?;
    if group.is_empty() {
        return reject(input, ErrorCode::NoContent, "macro group is empty");
    }
    if opt(':').parse_next(input)?.is_none() {
        return reject(
            input,
            ErrorCode::NoContent,
            "expected ':' between macro group and key",
        );
    }
    let key = take_while(0.., is_name_char).parse_next(input)?;
    if key.is_empty() {
        return reject(input, ErrorCode::NoContent, "macro key is empty");
    }
    if opt('%').parse_next(input)?.is_none() {
        return reject(
            input,
            ErrorCode::NoContent,
            "expected closing '%' after macro key",
        );
    }
    Ok(Segment::Macro {
        group: group.to_string(),
        key: key.to_string(),
    })
}

/// Parse a reference: $[ID]
fn reference(input: &mut &str) -> ModalResult<Segment> {
    "$[".parse_next(input)?;
    let id = take_while(0.., is_name_char).parse_next(input)?;
    if id.is_empty() {
        return reject(input, ErrorCode::NoContent, "reference id is empty");
    }
    if opt(']').parse_next(input)?.is_none() {
        return reject(
            input,
            ErrorCode::NoContent,
            "expected closing ']' after reference id",
        );
    }
    Ok(Segment::Reference(id.to_string()))
}

/// Parse a plugin call: $(NAME), $(NAME=ARGS), $(NAME|SCOPE), $(NAME=ARGS|SCOPE)
fn plugin(input: &mut &str) -> ModalResult<Segment> {
    "$(".parse_next(input)?;
    let name = take_till(0.., |c: char| {
        matches!(c, '=' | '|' | ')' | '$' | '%') || c.is_whitespace()
    })
    .parse_next(input)?;
    if input.is_empty() {
        return reject(
            input,
            ErrorCode::NoPluginContent,
            "plugin token is never closed",
        );
    }
    if input.starts_with(|c: char| c == '$' || c == '%' || c.is_whitespace()) {
        return reject(
            input,
            ErrorCode::NoPluginName,
            "plugin name cannot contain '$', '%' or whitespace",
        );
    }
    if name.is_empty() {
        return reject(input, ErrorCode::NoPluginName, "plugin name is empty");
    }

    let args = if opt('=').parse_next(input)?.is_some() {
        Some(plugin_part(input, Level::Args)?)
    } else {
        None
    };
    let scope = if opt('|').parse_next(input)?.is_some() {
        Some(plugin_part(input, Level::Scope)?)
    } else {
        None
    };

    let empty_args = args.as_ref().is_some_and(Vec::is_empty);
    let empty_scope = scope.as_ref().is_some_and(Vec::is_empty);
    if empty_args && empty_scope {
        return reject(
            input,
            ErrorCode::NoPluginContentAndValue,
            "plugin args and scope are both empty",
        );
    }
    if empty_args {
        return reject(input, ErrorCode::NoPluginContent, "plugin args are empty");
    }
    if empty_scope {
        return reject(input, ErrorCode::NoPluginContent, "plugin scope is empty");
    }

    if opt(')').parse_next(input)?.is_none() {
        return reject(
            input,
            ErrorCode::NoPluginContent,
            "expected ')' to close plugin",
        );
    }

    Ok(Segment::Plugin {
        name: name.to_string(),
        args,
        scope,
    })
}

/// Parse the args or scope of a plugin, which must be closed before the input ends.
fn plugin_part(input: &mut &str, level: Level) -> ModalResult<Vec<Segment>> {
    let part = segments(input, level)?;
    if input.is_empty() {
        let detail = if level == Level::Args {
            "plugin args are never closed"
        } else {
            "plugin scope is never closed"
        };
        return reject(input, ErrorCode::NoChildren, detail);
    }
    Ok(part)
}

/// Check if a character can appear in a macro group, macro key or reference id.
fn is_name_char(c: char) -> bool {
    !c.is_whitespace()
        && !matches!(
            c,
            '%' | ':' | '$' | '(' | ')' | '[' | ']' | '|' | '=' | '\\'
        )
}
