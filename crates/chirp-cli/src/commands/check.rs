//! Implementation of the `chirp check` command.

use std::collections::{BTreeSet, HashSet};
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use chirp::parser::{parse_strings_file, parse_template, ParseError};
use chirp::{build_by_id, plugins, ErrorCode, RegistryError, StringTable, TemplateError};
use miette::{IntoDiagnostic, Report};
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use crate::output::{help_for, ChirpDiagnostic};

/// Arguments for the check command.
#[derive(Debug, clap::Args)]
pub struct CheckArgs {
    /// Files to check (.strings)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Names of plugins provided by the bot, in addition to the standard ones
    #[arg(long = "plugin", value_delimiter = ',')]
    pub plugins: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// A problem found in a string file.
#[derive(Debug)]
enum Finding {
    Io(String),
    Syntax(ParseError),
    Registry(RegistryError),
    Duplicate { id: String },
    Template { id: String, error: TemplateError },
    UnknownPlugin { id: String, plugin: String },
}

impl Finding {
    fn is_error(&self) -> bool {
        !matches!(self, Finding::UnknownPlugin { .. })
    }

    fn id(&self) -> Option<&str> {
        match self {
            Finding::Io(_) | Finding::Syntax(_) | Finding::Registry(_) => None,
            Finding::Duplicate { id }
            | Finding::Template { id, .. }
            | Finding::UnknownPlugin { id, .. } => Some(id),
        }
    }

    fn message(&self) -> String {
        match self {
            Finding::Io(message) => message.clone(),
            Finding::Syntax(error) => error.to_string(),
            Finding::Registry(error) => error.to_string(),
            Finding::Duplicate { id } => format!("duplicate string id '{id}'"),
            Finding::Template { id, error } => format!("{id}: {error}"),
            Finding::UnknownPlugin { id, plugin } => {
                format!("{id}: plugin '{plugin}' is not a known plugin")
            }
        }
    }

    fn issue(&self) -> Issue {
        let code = match self {
            Finding::Template { error, .. } => Some(error.code()),
            _ => None,
        };
        Issue {
            id: self.id().map(ToString::to_string),
            code,
            message: self.message(),
        }
    }
}

/// JSON form of a finding.
#[derive(Serialize)]
pub struct Issue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    pub message: String,
}

/// JSON output for one checked file.
#[derive(Serialize)]
pub struct FileReport {
    pub path: String,
    pub strings: usize,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

/// Result of checking one file.
struct FileCheck {
    content: String,
    strings: usize,
    findings: Vec<Finding>,
}

/// Run the check command.
pub fn run_check(args: CheckArgs) -> miette::Result<i32> {
    let known: BTreeSet<String> = plugins::standard()
        .into_diagnostic()?
        .ids()
        .into_iter()
        .chain(args.plugins.iter().cloned())
        .collect();

    let mut failed = false;
    let mut reports = Vec::new();
    for path in &args.files {
        let check = check_file(path, &known);
        failed |= check.findings.iter().any(Finding::is_error);
        if args.json {
            let (errors, warnings): (Vec<&Finding>, Vec<&Finding>) =
                check.findings.iter().partition(|finding| finding.is_error());
            reports.push(FileReport {
                path: path.display().to_string(),
                strings: check.strings,
                errors: errors.into_iter().map(Finding::issue).collect(),
                warnings: warnings.into_iter().map(Finding::issue).collect(),
            });
        } else {
            print_check(path, &check);
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports).into_diagnostic()?);
    }
    Ok(if failed { exitcode::DATAERR } else { exitcode::OK })
}

/// Check a single file, collecting every problem instead of stopping at the first.
fn check_file(path: &Path, known: &BTreeSet<String>) -> FileCheck {
    let content = match read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            return FileCheck {
                content: String::new(),
                strings: 0,
                findings: vec![Finding::Io(format!("cannot read {}: {}", path.display(), e))],
            };
        }
    };
    let definitions = match parse_strings_file(&content) {
        Ok(definitions) => definitions,
        Err(e) => {
            return FileCheck {
                content,
                strings: 0,
                findings: vec![Finding::Syntax(e)],
            };
        }
    };

    let mut findings = Vec::new();
    let mut seen = HashSet::new();
    let mut valid = Vec::new();
    for definition in definitions {
        if !seen.insert(definition.id.clone()) {
            findings.push(Finding::Duplicate { id: definition.id });
            continue;
        }
        match parse_template(&definition.template) {
            Ok(_) => valid.push(definition),
            Err(error) => findings.push(Finding::Template {
                id: definition.id,
                error,
            }),
        }
    }

    let strings = match StringTable::from_definitions(valid) {
        Ok(strings) => strings,
        Err(e) => {
            findings.push(Finding::Registry(e));
            return FileCheck {
                content,
                strings: seen.len(),
                findings,
            };
        }
    };

    for id in strings.ids() {
        match build_by_id(&id, &strings) {
            Ok(tree) => {
                for plugin in tree.plugin_names() {
                    if !known.contains(plugin) {
                        findings.push(Finding::UnknownPlugin {
                            id: id.clone(),
                            plugin: plugin.to_string(),
                        });
                    }
                }
            }
            Err(error) => findings.push(Finding::Template { id, error }),
        }
    }

    FileCheck {
        content,
        strings: seen.len(),
        findings,
    }
}

/// Print the findings of one file in human readable form.
fn print_check(path: &Path, check: &FileCheck) {
    for finding in &check.findings {
        match finding {
            Finding::Syntax(error) => {
                let diagnostic = ChirpDiagnostic::from_parse_error(path, &check.content, error);
                eprintln!("{:?}", Report::new(diagnostic));
            }
            Finding::Duplicate { id } | Finding::Template { id, .. } => {
                let help = match finding {
                    Finding::Template { error, .. } => help_for(error.code()),
                    _ => None,
                };
                let diagnostic =
                    ChirpDiagnostic::at_string(path, &check.content, id, finding.message(), help);
                eprintln!("{:?}", Report::new(diagnostic));
            }
            Finding::Io(_) | Finding::Registry(_) => {
                eprintln!(
                    "{} {}",
                    "error:".if_supports_color(Stream::Stderr, |t| t.red()),
                    finding.message()
                );
            }
            Finding::UnknownPlugin { .. } => {
                eprintln!(
                    "{} {}",
                    "warning:".if_supports_color(Stream::Stderr, |t| t.yellow()),
                    finding.message()
                );
            }
        }
    }

    let errors = check.findings.iter().filter(|f| f.is_error()).count();
    if errors == 0 {
        println!(
            "{} {} ({} strings)",
            "ok".if_supports_color(Stream::Stdout, |t| t.green()),
            path.display(),
            check.strings
        );
    } else {
        println!(
            "{} {} ({} errors)",
            "failed".if_supports_color(Stream::Stdout, |t| t.red()),
            path.display(),
            errors
        );
    }
}
