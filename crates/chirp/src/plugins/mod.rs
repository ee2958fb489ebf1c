//! Generic plugins every bot can register.
//!
//! These plugins carry no business logic: text casing, conditionals over
//! their args, random numbers and duration formatting. Bot-specific plugins
//! (users, points, song lookups, ...) are registered by the bot itself.

mod compare;
mod random;
mod text;

use std::sync::Arc;

pub use compare::Comparison;
pub use random::RandomNumber;

use crate::interpreter::RegistryError;
use crate::types::{Plugin, PluginMap, from_fn};

pub const UPPERCASE: &str = "UPPERCASE";
pub const LOWERCASE: &str = "LOWERCASE";
pub const STOPWATCH: &str = "STOPWATCH";
pub const RANDOM_NUMBER: &str = "RANDOM_NUMBER";
pub const IF_EQUAL: &str = "IF_EQUAL";
pub const IF_NOT_EQUAL: &str = "IF_NOT_EQUAL";
pub const IF_GREATER: &str = "IF_GREATER";
pub const IF_SMALLER: &str = "IF_SMALLER";
pub const IF_TRUE: &str = "IF_TRUE";
pub const IF_FALSE: &str = "IF_FALSE";
pub const IF_UNDEFINED: &str = "IF_UNDEFINED";
pub const IF_NOT_UNDEFINED: &str = "IF_NOT_UNDEFINED";

/// Build a plugin map with every standard plugin.
pub fn standard() -> Result<PluginMap, RegistryError> {
    PluginMap::from_plugins(entries())
}

/// Register the standard plugins into an existing map.
///
/// Returns an error if the map already contains one of the standard ids.
pub fn register_standard(plugins: &mut PluginMap) -> Result<(), RegistryError> {
    for (id, plugin) in entries() {
        plugins.register(id, plugin)?;
    }
    Ok(())
}

fn entries() -> [(&'static str, Arc<dyn Plugin>); 12] {
    [
        (UPPERCASE, from_fn(text::uppercase)),
        (LOWERCASE, from_fn(text::lowercase)),
        (STOPWATCH, from_fn(text::stopwatch)),
        (RANDOM_NUMBER, Arc::new(RandomNumber::new()) as Arc<dyn Plugin>),
        (IF_EQUAL, from_fn(compare::if_equal)),
        (IF_NOT_EQUAL, from_fn(compare::if_not_equal)),
        (IF_GREATER, from_fn(compare::if_greater)),
        (IF_SMALLER, from_fn(compare::if_smaller)),
        (IF_TRUE, from_fn(compare::if_true)),
        (IF_FALSE, from_fn(compare::if_false)),
        (IF_UNDEFINED, from_fn(compare::if_undefined)),
        (IF_NOT_UNDEFINED, from_fn(compare::if_not_undefined)),
    ]
}

/// Get the args of a plugin that cannot work without them.
fn required_args<'a>(name: &str, args: Option<&'a str>) -> anyhow::Result<&'a str> {
    args.ok_or_else(|| anyhow::anyhow!("{name} requires args"))
}
