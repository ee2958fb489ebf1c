use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use async_trait::async_trait;

use super::MacroMap;
use crate::interpreter::RegistryError;

/// Input handed to a plugin when its token is evaluated.
#[derive(Debug, Clone, Copy)]
pub struct PluginInput<'a> {
    /// Evaluated args of the token, if it had any.
    pub args: Option<&'a str>,
    /// Whether the token has a scope that can be shown.
    pub has_scope: bool,
}

/// What a plugin produces.
#[derive(Debug, Clone, PartialEq)]
pub enum PluginOutput {
    /// Literal text that replaces the plugin token. A scope is not evaluated.
    Text(String),
    /// Macros made visible while the token's scope is evaluated. The token
    /// evaluates to its scope, or to nothing when it has none.
    Macros(MacroMap),
}

impl PluginOutput {
    /// Show the scope without adding macros.
    pub fn show_scope() -> Self {
        PluginOutput::Macros(MacroMap::new())
    }

    /// Evaluate to nothing.
    pub fn empty() -> Self {
        PluginOutput::Text(String::new())
    }

    /// Show the scope when `condition` holds, evaluate to nothing otherwise.
    pub fn scope_if(condition: bool) -> Self {
        if condition {
            PluginOutput::show_scope()
        } else {
            PluginOutput::empty()
        }
    }
}

impl From<String> for PluginOutput {
    fn from(text: String) -> Self {
        PluginOutput::Text(text)
    }
}

impl From<&str> for PluginOutput {
    fn from(text: &str) -> Self {
        PluginOutput::Text(text.to_string())
    }
}

impl From<MacroMap> for PluginOutput {
    fn from(macros: MacroMap) -> Self {
        PluginOutput::Macros(macros)
    }
}

/// A computed template fragment.
///
/// Plugins are stateless as far as the engine is concerned. Any state they
/// need, such as an API client, lives in the implementing type. Plugins may
/// suspend (e.g. for network calls); the evaluator awaits them one at a time
/// in template order.
#[async_trait]
pub trait Plugin: Send + Sync {
    async fn call(&self, input: PluginInput<'_>) -> anyhow::Result<PluginOutput>;

    /// Whether this plugin exists to provide macros to its scope.
    ///
    /// A failure of such a plugin is reported as a macro error rather than
    /// a plugin error.
    fn generates_macros(&self) -> bool {
        false
    }
}

/// Plugin implemented by a synchronous function.
struct FnPlugin<F>(F);

#[async_trait]
impl<F> Plugin for FnPlugin<F>
where
    F: Fn(PluginInput<'_>) -> anyhow::Result<PluginOutput> + Send + Sync,
{
    async fn call(&self, input: PluginInput<'_>) -> anyhow::Result<PluginOutput> {
        (self.0)(input)
    }
}

/// Macro-generating plugin implemented by a synchronous function.
struct MacroFnPlugin<F>(F);

#[async_trait]
impl<F> Plugin for MacroFnPlugin<F>
where
    F: Fn(PluginInput<'_>) -> anyhow::Result<MacroMap> + Send + Sync,
{
    async fn call(&self, input: PluginInput<'_>) -> anyhow::Result<PluginOutput> {
        (self.0)(input).map(PluginOutput::Macros)
    }

    fn generates_macros(&self) -> bool {
        true
    }
}

/// Wrap a synchronous function as a plugin.
///
/// # Example
///
/// ```
/// use chirp::{PluginOutput, from_fn};
///
/// let user = from_fn(|_| Ok(PluginOutput::from("Alice")));
/// ```
pub fn from_fn<F>(f: F) -> Arc<dyn Plugin>
where
    F: Fn(PluginInput<'_>) -> anyhow::Result<PluginOutput> + Send + Sync + 'static,
{
    Arc::new(FnPlugin(f))
}

/// Wrap a synchronous function that generates macros for the token's scope.
///
/// # Example
///
/// ```
/// use chirp::{MacroDictionary, MacroMap, macro_fn};
///
/// let song = macro_fn(|_| {
///     let current = MacroDictionary::new().with("TITLE", "Blue Zenith");
///     Ok(MacroMap::new().with_group("SONG", current))
/// });
/// assert!(song.generates_macros());
/// ```
pub fn macro_fn<F>(f: F) -> Arc<dyn Plugin>
where
    F: Fn(PluginInput<'_>) -> anyhow::Result<MacroMap> + Send + Sync + 'static,
{
    Arc::new(MacroFnPlugin(f))
}

/// A registry of plugins by id.
///
/// Built once at startup, then shared read-only by every reply.
#[derive(Clone, Default)]
pub struct PluginMap {
    plugins: HashMap<String, Arc<dyn Plugin>>,
}

impl PluginMap {
    /// Create an empty plugin map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a plugin map from a list of plugins.
    ///
    /// Returns an error if a plugin id appears more than once.
    pub fn from_plugins<I, S>(plugins: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (S, Arc<dyn Plugin>)>,
        S: Into<String>,
    {
        let mut map = PluginMap::new();
        for (id, plugin) in plugins {
            map.register(id, plugin)?;
        }
        Ok(map)
    }

    /// Register a plugin, failing if the id is already taken.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        plugin: Arc<dyn Plugin>,
    ) -> Result<(), RegistryError> {
        match self.plugins.entry(id.into()) {
            Entry::Occupied(entry) => Err(RegistryError::DuplicateId {
                registry: "plugin",
                id: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(plugin);
                Ok(())
            }
        }
    }

    /// Merge another plugin map into this one, failing on a shared id.
    pub fn extend(&mut self, other: PluginMap) -> Result<(), RegistryError> {
        let mut entries: Vec<_> = other.plugins.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (id, plugin) in entries {
            self.register(id, plugin)?;
        }
        Ok(())
    }

    /// Look up a plugin by id.
    pub fn get(&self, id: &str) -> Option<&Arc<dyn Plugin>> {
        self.plugins.get(id)
    }

    /// Check if a plugin id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.plugins.contains_key(id)
    }

    /// All registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.plugins.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Check if no plugins are registered.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl Debug for PluginMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PluginMap")
            .field("ids", &self.ids())
            .finish()
    }
}
