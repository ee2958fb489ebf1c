//! Build context for tracking reference expansion.

use crate::interpreter::TemplateError;

/// State carried through recursive reference expansion.
///
/// The context keeps the chain of string ids currently being expanded so a
/// reference back into that chain is reported instead of recursing forever.
#[derive(Debug, Default)]
pub struct BuildContext {
    /// Ids currently being expanded, outermost first.
    call_stack: Vec<String>,
}

impl BuildContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an id is in the current expansion chain.
    pub fn is_in_call_stack(&self, id: &str) -> bool {
        self.call_stack.iter().any(|n| n == id)
    }

    /// Push a string id onto the stack.
    ///
    /// Returns an error if the id is already being expanded.
    pub fn push_reference(&mut self, id: &str) -> Result<(), TemplateError> {
        if self.is_in_call_stack(id) {
            let mut chain = self.call_stack.clone();
            chain.push(id.to_string());
            return Err(TemplateError::ReferenceCycle { chain });
        }
        self.call_stack.push(id.to_string());
        Ok(())
    }

    /// Pop a string id from the stack.
    pub fn pop_reference(&mut self) {
        self.call_stack.pop();
    }
}
