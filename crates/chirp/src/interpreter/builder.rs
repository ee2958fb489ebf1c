//! Builds parse trees from template ASTs.
//!
//! Building resolves every `$[ID]` reference against the string table and
//! splices the referenced template's nodes in its place, so the resulting
//! tree needs nothing but macros and plugins to be evaluated.

use crate::interpreter::error::compute_suggestions;
use crate::interpreter::tree::{Node, ParseTree};
use crate::interpreter::{BuildContext, StringTable, TemplateError};
use crate::parser::ast::{Segment, Template};

/// Build a parse tree from a parsed template.
///
/// # Errors
///
/// Returns an error if:
/// - A reference names an id missing from the string table
/// - A chain of references leads back to a string being expanded
pub fn build(template: &Template, strings: &StringTable) -> Result<ParseTree, TemplateError> {
    let mut ctx = BuildContext::new();
    let nodes = build_segments(&template.segments, strings, &mut ctx)?;
    Ok(ParseTree { nodes })
}

/// Build the parse tree of a string table entry.
///
/// The entry itself counts as being expanded, so a string that references
/// itself is reported as a cycle.
pub fn build_by_id(id: &str, strings: &StringTable) -> Result<ParseTree, TemplateError> {
    let mut ctx = BuildContext::new();
    let nodes = expand_reference(id, strings, &mut ctx)?;
    Ok(ParseTree { nodes })
}

fn build_segments(
    segments: &[Segment],
    strings: &StringTable,
    ctx: &mut BuildContext,
) -> Result<Vec<Node>, TemplateError> {
    let mut nodes = Vec::with_capacity(segments.len());
    for segment in segments {
        match segment {
            Segment::Text(text) => push_text(&mut nodes, text),
            Segment::Macro { group, key } => nodes.push(Node::Macro {
                group: group.clone(),
                key: key.clone(),
            }),
            Segment::Reference(id) => {
                for node in expand_reference(id, strings, ctx)? {
                    match node {
                        Node::Text(text) => push_text(&mut nodes, &text),
                        other => nodes.push(other),
                    }
                }
            }
            Segment::Plugin { name, args, scope } => {
                let args = args
                    .as_deref()
                    .map(|args| build_segments(args, strings, ctx))
                    .transpose()?;
                let scope = scope
                    .as_deref()
                    .map(|scope| build_segments(scope, strings, ctx))
                    .transpose()?;
                nodes.push(Node::Plugin {
                    name: name.clone(),
                    args,
                    scope,
                });
            }
        }
    }
    Ok(nodes)
}

/// Build the nodes of the string `id` with cycle detection.
fn expand_reference(
    id: &str,
    strings: &StringTable,
    ctx: &mut BuildContext,
) -> Result<Vec<Node>, TemplateError> {
    let template = strings
        .parsed(id)
        .ok_or_else(|| TemplateError::StringNotFound {
            id: id.to_string(),
            suggestions: compute_suggestions(id, &strings.ids()),
        })?;
    ctx.push_reference(id)?;
    let nodes = build_segments(&template.segments, strings, ctx)?;
    ctx.pop_reference();
    Ok(nodes)
}

/// Append text, merging it into a preceding text node.
fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if let Some(Node::Text(prev)) = nodes.last_mut() {
        prev.push_str(text);
    } else {
        nodes.push(Node::Text(text.to_string()));
    }
}
