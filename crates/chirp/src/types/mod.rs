mod macros;
mod plugin;
mod string_entry;
mod value;

pub use macros::{MacroDictionary, MacroMap};
pub use plugin::{Plugin, PluginInput, PluginMap, PluginOutput, from_fn, macro_fn};
pub use string_entry::StringEntry;
pub use value::{MacroValue, UNDEFINED};
