//! Built parse trees, ready for evaluation.

use std::collections::BTreeSet;

/// A node of a built parse tree.
///
/// Unlike [`Segment`](crate::parser::Segment), a node is never a reference:
/// references are replaced by the referenced template's nodes while building.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal output.
    Text(String),
    /// Macro looked up in the macro map during evaluation.
    Macro { group: String, key: String },
    /// Plugin call with optional args and scope subtrees.
    Plugin {
        name: String,
        args: Option<Vec<Node>>,
        scope: Option<Vec<Node>>,
    },
}

/// An immutable tree built from a template, owned by a single render call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseTree {
    pub nodes: Vec<Node>,
}

impl ParseTree {
    /// Names of all plugins invoked anywhere in the tree.
    pub fn plugin_names(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        walk(&self.nodes, &mut |node| {
            if let Node::Plugin { name, .. } = node {
                names.insert(name.as_str());
            }
        });
        names
    }

    /// All `(group, key)` macro pairs used anywhere in the tree.
    pub fn macro_keys(&self) -> BTreeSet<(&str, &str)> {
        let mut keys = BTreeSet::new();
        walk(&self.nodes, &mut |node| {
            if let Node::Macro { group, key } = node {
                keys.insert((group.as_str(), key.as_str()));
            }
        });
        keys
    }

    /// Check if the tree is plain text only.
    pub fn is_static(&self) -> bool {
        self.nodes.iter().all(|node| matches!(node, Node::Text(_)))
    }
}

/// Visit every node depth-first, in document order.
fn walk<'a>(nodes: &'a [Node], visit: &mut impl FnMut(&'a Node)) {
    for node in nodes {
        visit(node);
        if let Node::Plugin { args, scope, .. } = node {
            for child in [args, scope].into_iter().flatten() {
                walk(child, visit);
            }
        }
    }
}
