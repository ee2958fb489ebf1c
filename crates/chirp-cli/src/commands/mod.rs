//! CLI command implementations.

mod check;
mod eval;
mod list;

pub use check::{run_check, CheckArgs};
pub use eval::{run_eval, EvalArgs};
pub use list::{run_list, ListArgs};

use std::fs::read_to_string;
use std::path::Path;

use chirp::parser::{parse_strings_file, StringDefinition};
use chirp::StringTable;

use crate::output::ChirpDiagnostic;

/// Read and parse a string file, reporting syntax errors against its source.
fn read_definitions(path: &Path) -> miette::Result<Vec<StringDefinition>> {
    let content = read_to_string(path)
        .map_err(|e| miette::miette!("Cannot read string file {}: {}", path.display(), e))?;
    parse_strings_file(&content)
        .map_err(|e| ChirpDiagnostic::from_parse_error(path, &content, &e).into())
}

/// Load a string table, applying the custom strings of `custom` on top.
fn load_strings(strings: Option<&Path>, custom: Option<&Path>) -> miette::Result<StringTable> {
    let table = match strings {
        Some(path) => StringTable::from_definitions(read_definitions(path)?)
            .map_err(|e| miette::miette!("{}: {}", path.display(), e))?,
        None => StringTable::default(),
    };
    let Some(path) = custom else {
        return Ok(table);
    };
    let overrides = read_definitions(path)?
        .into_iter()
        .map(|definition| (definition.id, definition.template));
    table
        .with_overrides(overrides)
        .map_err(|e| miette::miette!("{}: {}", path.display(), e))
}
