//! Template expansion for chat bot replies.
//!
//! Reply templates mix literal text with three kinds of tokens:
//!
//! - `%GROUP:KEY%` substitutes a macro value supplied with the reply
//! - `$[ID]` inlines another string of the [`StringTable`]
//! - `$(NAME=args|scope)` invokes a [`Plugin`], optionally with args and a
//!   scope that can use macros produced by the plugin
//!
//! Templates are parsed into an AST, references are spliced into a
//! [`ParseTree`], and the tree is evaluated asynchronously against a
//! [`PluginMap`] and a [`MacroMap`].

pub mod interpreter;
pub mod parser;
pub mod plugins;
pub mod types;

pub use interpreter::{
    Engine, ErrorCode, LoadError, Node, ParseTree, RegistryError, StringTable, TemplateError,
    build, build_by_id, compute_suggestions, evaluate, parse, parse_by_id,
};
pub use types::{
    MacroDictionary, MacroMap, MacroValue, Plugin, PluginInput, PluginMap, PluginOutput,
    StringEntry, UNDEFINED, from_fn, macro_fn,
};

/// Creates a [`MacroMap`] from groups of key-value pairs.
///
/// Values are converted via `Into<MacroValue>`, so integers, floats, bools,
/// strings and options can be passed directly.
///
/// # Example
///
/// ```
/// use chirp::macros;
///
/// let m = macros! {
///     "USER" => { "NAME" => "Alice", "POINTS" => 3 },
///     "STREAM" => { "GAME" => "Celeste" },
/// };
/// assert_eq!(m.len(), 2);
/// assert_eq!(m.get("USER", "POINTS"), Some("3"));
/// assert_eq!(m.get("STREAM", "GAME"), Some("Celeste"));
/// ```
#[macro_export]
macro_rules! macros {
    {} => {
        $crate::MacroMap::new()
    };
    { $($group:expr => { $($key:expr => $value:expr),* $(,)? }),+ $(,)? } => {
        {
            let mut map = $crate::MacroMap::new();
            $(
                let mut dictionary = $crate::MacroDictionary::new();
                $(
                    dictionary.insert($key.to_string(), $value);
                )*
                map = map.with_group($group.to_string(), dictionary);
            )+
            map
        }
    };
}
