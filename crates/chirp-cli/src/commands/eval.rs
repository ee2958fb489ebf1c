//! Implementation of the `chirp eval` command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chirp::{plugins, Engine, ErrorCode, MacroDictionary, MacroMap};
use miette::IntoDiagnostic;
use serde::Serialize;

use super::load_strings;

/// Arguments for the eval command.
#[derive(Debug, clap::Args)]
pub struct EvalArgs {
    /// Template string to evaluate
    #[arg(long, conflicts_with = "id", required_unless_present = "id")]
    pub template: Option<String>,

    /// Id of a string to evaluate
    #[arg(long)]
    pub id: Option<String>,

    /// File with string definitions (.strings)
    #[arg(long, env = "CHIRP_STRINGS")]
    pub strings: Option<PathBuf>,

    /// File with custom templates overriding the defaults
    #[arg(long, requires = "strings")]
    pub custom: Option<PathBuf>,

    /// Macros in GROUP:KEY=VALUE format (repeatable)
    #[arg(short = 'm', long = "macro", value_parser = parse_macro)]
    pub macros: Vec<(String, String, String)>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output for eval results.
#[derive(Serialize)]
#[serde(untagged)]
pub enum EvalResult {
    Rendered { result: String },
    Failed { code: ErrorCode, error: String },
}

/// Parse a GROUP:KEY=VALUE macro string.
fn parse_macro(s: &str) -> Result<(String, String, String), String> {
    let invalid = || format!("invalid macro format '{}': expected GROUP:KEY=VALUE", s);
    let (name, value) = s.split_once('=').ok_or_else(invalid)?;
    let (group, key) = name.split_once(':').ok_or_else(invalid)?;
    if group.is_empty() || key.is_empty() {
        return Err(invalid());
    }
    Ok((group.to_string(), key.to_string(), value.to_string()))
}

/// Collect macro arguments into groups.
fn macro_map(macros: Vec<(String, String, String)>) -> MacroMap {
    let mut groups: BTreeMap<String, MacroDictionary> = BTreeMap::new();
    for (group, key, value) in macros {
        groups.entry(group).or_default().insert(key, value);
    }
    groups
        .into_iter()
        .fold(MacroMap::new(), |map, (id, dictionary)| {
            map.with_group(id, dictionary)
        })
}

/// Run the eval command.
pub async fn run_eval(args: EvalArgs) -> miette::Result<i32> {
    let strings = load_strings(args.strings.as_deref(), args.custom.as_deref())?;
    let engine = Engine::builder()
        .strings(strings)
        .plugins(plugins::standard().into_diagnostic()?)
        .build();
    let macros = macro_map(args.macros);

    let rendered = match (&args.id, &args.template) {
        (Some(id), _) => engine.render_by_id(id, &macros).await,
        (None, Some(template)) => engine.render(template, &macros).await,
        (None, None) => return Err(miette::miette!("either --template or --id is required")),
    };

    match rendered {
        Ok(result) => {
            if args.json {
                let output = EvalResult::Rendered { result };
                println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
            } else {
                println!("{}", result);
            }
            Ok(exitcode::OK)
        }
        Err(e) => {
            if args.json {
                let output = EvalResult::Failed {
                    code: e.code(),
                    error: e.to_string(),
                };
                eprintln!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
            } else {
                eprintln!("Evaluation error: {}", e);
            }
            Ok(exitcode::DATAERR)
        }
    }
}
