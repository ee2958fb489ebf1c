//! Entry points for rendering replies.
//!
//! The free functions take every registry explicitly. [`Engine`] bundles the
//! process-wide registries for callers that render many replies.

use std::sync::Arc;

use bon::Builder;
use tracing::{Instrument, debug_span, warn};

use crate::interpreter::tree::ParseTree;
use crate::interpreter::{StringTable, TemplateError, build, build_by_id, evaluate};
use crate::parser::parse_template;
use crate::types::{MacroMap, PluginMap};

/// Parse, build and evaluate an ad hoc template.
///
/// Failures are logged together with the template and returned unchanged;
/// no fallback text is ever substituted.
///
/// # Example
///
/// ```
/// use chirp::{MacroDictionary, MacroMap, PluginMap, StringTable, parse};
///
/// # futures::executor::block_on(async {
/// let macros = MacroMap::new().with_group("USER", MacroDictionary::new().with("NAME", "Alice"));
/// let reply = parse(
///     "Hi %USER:NAME%!",
///     &StringTable::default(),
///     &PluginMap::new(),
///     &macros,
/// )
/// .await
/// .unwrap();
/// assert_eq!(reply, "Hi Alice!");
/// # });
/// ```
pub async fn parse(
    template: &str,
    strings: &StringTable,
    plugins: &PluginMap,
    macros: &MacroMap,
) -> Result<String, TemplateError> {
    let result = async {
        let tree = build_template(template, strings)?;
        evaluate(&tree, plugins, macros).await
    }
    .instrument(debug_span!("render", template))
    .await;

    if let Err(error) = &result {
        warn!(template, code = %error.code(), %error, "failed to render template");
    }
    result
}

/// Build and evaluate the string table entry `id`.
///
/// Returns [`TemplateError::StringNotFound`] before anything is evaluated if
/// the id does not exist.
pub async fn parse_by_id(
    id: &str,
    strings: &StringTable,
    plugins: &PluginMap,
    macros: &MacroMap,
) -> Result<String, TemplateError> {
    let result = async {
        let tree = build_by_id(id, strings)?;
        evaluate(&tree, plugins, macros).await
    }
    .instrument(debug_span!("render", id))
    .await;

    if let Err(error) = &result {
        warn!(
            id,
            template = strings.template(id).unwrap_or_default(),
            code = %error.code(),
            %error,
            "failed to render string"
        );
    }
    result
}

/// Parse a template and build its tree without evaluating it.
pub fn build_template(template: &str, strings: &StringTable) -> Result<ParseTree, TemplateError> {
    let ast = parse_template(template)?;
    build(&ast, strings)
}

/// The registries a bot renders its replies with.
///
/// Cloning is cheap: registries are shared behind `Arc`. Replacing the string
/// table (e.g. after custom strings changed) yields a new engine and leaves
/// renders already in progress untouched.
///
/// # Example
///
/// ```
/// use chirp::{Engine, MacroMap, PluginMap, PluginOutput, StringEntry, StringTable, from_fn};
///
/// let strings = StringTable::new([StringEntry::new("HELLO", "Hello $(USER)!")]).unwrap();
/// let plugins = PluginMap::from_plugins([(
///     "USER",
///     from_fn(|_| Ok(PluginOutput::from("Alice"))),
/// )])
/// .unwrap();
///
/// let engine = Engine::builder().strings(strings).plugins(plugins).build();
/// # futures::executor::block_on(async {
/// let reply = engine.render_by_id("HELLO", &MacroMap::new()).await.unwrap();
/// assert_eq!(reply, "Hello Alice!");
/// # });
/// ```
#[derive(Debug, Clone, Default, Builder)]
pub struct Engine {
    /// String table used for references and lookups by id.
    #[builder(default, into)]
    strings: Arc<StringTable>,

    /// Plugins available to every template.
    #[builder(default, into)]
    plugins: Arc<PluginMap>,
}

impl Engine {
    /// Get the string table.
    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    /// Get the plugin map.
    pub fn plugins(&self) -> &PluginMap {
        &self.plugins
    }

    /// Return an engine that uses `strings` and shares this engine's plugins.
    pub fn with_strings(&self, strings: impl Into<Arc<StringTable>>) -> Engine {
        Engine {
            strings: strings.into(),
            plugins: Arc::clone(&self.plugins),
        }
    }

    /// Render an ad hoc template.
    pub async fn render(&self, template: &str, macros: &MacroMap) -> Result<String, TemplateError> {
        parse(template, &self.strings, &self.plugins, macros).await
    }

    /// Render the string table entry `id`.
    pub async fn render_by_id(&self, id: &str, macros: &MacroMap) -> Result<String, TemplateError> {
        parse_by_id(id, &self.strings, &self.plugins, macros).await
    }

    /// Build the tree of an ad hoc template without evaluating it.
    pub fn build(&self, template: &str) -> Result<ParseTree, TemplateError> {
        build_template(template, &self.strings)
    }
}
