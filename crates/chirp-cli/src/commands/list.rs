//! Implementation of the `chirp list` command.

use std::path::PathBuf;

use miette::IntoDiagnostic;
use serde::Serialize;

use super::load_strings;
use crate::output::format_strings_table;

/// Arguments for the list command.
#[derive(Debug, clap::Args)]
pub struct ListArgs {
    /// String file to list (.strings)
    pub file: PathBuf,

    /// String file with custom templates overriding the defaults
    #[arg(long)]
    pub custom: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output for a listed string.
#[derive(Serialize)]
pub struct ListedString<'a> {
    pub id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub template: &'a str,
    pub custom: bool,
}

/// Run the list command.
pub fn run_list(args: ListArgs) -> miette::Result<i32> {
    let strings = load_strings(Some(&args.file), args.custom.as_deref())?;

    if args.json {
        let listed: Vec<ListedString<'_>> = strings
            .entries()
            .into_iter()
            .map(|entry| ListedString {
                id: &entry.id,
                description: entry.description.as_deref(),
                template: strings.template(&entry.id).unwrap_or(&entry.template),
                custom: strings.is_custom(&entry.id),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listed).into_diagnostic()?);
    } else {
        println!("{}", format_strings_table(&strings));
    }
    Ok(exitcode::OK)
}
