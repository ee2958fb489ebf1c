//! Output formatting for CLI commands.

mod diagnostic;
mod table;

pub use diagnostic::{help_for, ChirpDiagnostic};
pub use table::format_strings_table;
