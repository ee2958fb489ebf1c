//! Tree evaluation engine.
//!
//! This module walks a built parse tree depth-first and left to right,
//! substituting macros and awaiting plugins one at a time, and concatenates
//! the results into the final reply.

use futures::future::{BoxFuture, FutureExt};
use tracing::{Instrument, debug, debug_span};

use crate::interpreter::error::compute_suggestions;
use crate::interpreter::tree::{Node, ParseTree};
use crate::interpreter::TemplateError;
use crate::types::{MacroDictionary, MacroMap, PluginInput, PluginMap, PluginOutput};

/// Macro groups visible at one point of the evaluation.
///
/// Each macro-generating plugin pushes a scope whose groups shadow groups of
/// the same id from enclosing scopes while its own scope subtree evaluates.
#[derive(Debug, Clone, Copy)]
pub struct MacroScope<'a> {
    macros: &'a MacroMap,
    parent: Option<&'a MacroScope<'a>>,
}

impl<'a> MacroScope<'a> {
    /// Create the outermost scope.
    pub fn new(macros: &'a MacroMap) -> Self {
        MacroScope {
            macros,
            parent: None,
        }
    }

    /// Create a scope layered over this one.
    pub fn child<'b>(&'b self, macros: &'b MacroMap) -> MacroScope<'b>
    where
        'a: 'b,
    {
        MacroScope {
            macros,
            parent: Some(self),
        }
    }

    /// Find a group, innermost scope first.
    pub fn group(&self, id: &str) -> Option<&'a MacroDictionary> {
        match self.macros.group(id) {
            Some(dictionary) => Some(dictionary),
            None => self.parent.and_then(|parent| parent.group(id)),
        }
    }

    /// All visible group ids, sorted and deduplicated.
    pub fn group_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.macros.group_ids().map(ToString::to_string).collect();
        if let Some(parent) = self.parent {
            ids.extend(parent.group_ids());
        }
        ids.sort();
        ids.dedup();
        ids
    }
}

/// Evaluate a parse tree, producing the final string.
///
/// Plugins are invoked exactly once per plugin node, in document order, and
/// never concurrently with each other.
///
/// # Errors
///
/// Returns an error if:
/// - A macro group or key is missing
/// - A plugin is missing
/// - A plugin fails
pub async fn evaluate(
    tree: &ParseTree,
    plugins: &PluginMap,
    macros: &MacroMap,
) -> Result<String, TemplateError> {
    eval_nodes(&tree.nodes, plugins, MacroScope::new(macros)).await
}

/// Evaluate a list of nodes in order and concatenate the results.
pub fn eval_nodes<'a>(
    nodes: &'a [Node],
    plugins: &'a PluginMap,
    scope: MacroScope<'a>,
) -> BoxFuture<'a, Result<String, TemplateError>> {
    async move {
        let mut output = String::new();
        for node in nodes {
            match node {
                Node::Text(text) => output.push_str(text),
                Node::Macro { group, key } => output.push_str(resolve_macro(&scope, group, key)?),
                Node::Plugin {
                    name,
                    args,
                    scope: body,
                } => {
                    let text =
                        eval_plugin(name, args.as_deref(), body.as_deref(), plugins, scope).await?;
                    output.push_str(&text);
                }
            }
        }
        Ok(output)
    }
    .boxed()
}

/// Look up a macro value in the visible scopes.
fn resolve_macro<'a>(
    scope: &MacroScope<'a>,
    group: &str,
    key: &str,
) -> Result<&'a str, TemplateError> {
    let Some(dictionary) = scope.group(group) else {
        return Err(TemplateError::MacroNotFound {
            group: group.to_string(),
            key: key.to_string(),
            suggestions: compute_suggestions(group, &scope.group_ids()),
        });
    };
    dictionary.get(key).ok_or_else(|| {
        let mut keys: Vec<String> = dictionary.keys().map(ToString::to_string).collect();
        keys.sort();
        TemplateError::MacroNotFound {
            group: group.to_string(),
            key: key.to_string(),
            suggestions: compute_suggestions(key, &keys),
        }
    })
}

/// Evaluate a plugin node.
///
/// Args are evaluated before the plugin is called. The scope is evaluated
/// after the call, and only if the plugin produced macros for it.
async fn eval_plugin(
    name: &str,
    args: Option<&[Node]>,
    body: Option<&[Node]>,
    plugins: &PluginMap,
    scope: MacroScope<'_>,
) -> Result<String, TemplateError> {
    let plugin = plugins
        .get(name)
        .ok_or_else(|| TemplateError::PluginNotFound {
            name: name.to_string(),
            suggestions: compute_suggestions(name, &plugins.ids()),
        })?;

    let args = match args {
        Some(args) => Some(eval_nodes(args, plugins, scope).await?),
        None => None,
    };
    let input = PluginInput {
        args: args.as_deref(),
        has_scope: body.is_some(),
    };

    let output = plugin
        .call(input)
        .instrument(debug_span!("plugin", name))
        .await
        .map_err(|e| {
            let message = format!("{e:#}");
            if plugin.generates_macros() {
                TemplateError::MacroError {
                    plugin: name.to_string(),
                    message,
                }
            } else {
                TemplateError::PluginError {
                    name: name.to_string(),
                    message,
                }
            }
        })?;

    match (output, body) {
        (PluginOutput::Text(text), None) => Ok(text),
        (PluginOutput::Text(text), Some(_)) => {
            debug!(plugin = name, "plugin returned text, scope not evaluated");
            Ok(text)
        }
        (PluginOutput::Macros(macros), Some(body)) => {
            eval_nodes(body, plugins, scope.child(&macros)).await
        }
        (PluginOutput::Macros(_), None) => {
            debug!(plugin = name, "plugin returned macros but has no scope");
            Ok(String::new())
        }
    }
}
