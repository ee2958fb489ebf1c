//! Tests for error types and error message formatting.

use std::io::{self, ErrorKind};
use std::path::PathBuf;

use chirp::parser::parse_template;
use chirp::{ErrorCode, LoadError, RegistryError, TemplateError, compute_suggestions};
use insta::assert_snapshot;

// =============================================================================
// Suggestions
// =============================================================================

#[test]
fn compute_suggestions_finds_similar_keys() {
    let available = vec![
        "USER".to_string(),
        "USERS".to_string(),
        "SONG".to_string(),
        "STREAM".to_string(),
    ];

    // "USR" is close to "USER" (distance 1)
    let suggestions = compute_suggestions("USR", &available);
    assert_eq!(suggestions, vec!["USER"]);

    // Closest match first
    let suggestions = compute_suggestions("USERSX", &available);
    assert_eq!(suggestions[0], "USERS");
    assert!(suggestions.contains(&"USER".to_string()));

    // No close matches
    let suggestions = compute_suggestions("XYZ", &available);
    assert!(suggestions.is_empty());
}

#[test]
fn compute_suggestions_limits_to_three() {
    let available: Vec<String> = (0..10).map(|i| format!("ITEM{}", i)).collect();
    let suggestions = compute_suggestions("ITEM", &available);
    assert_eq!(suggestions.len(), 3);
}

// =============================================================================
// Error codes
// =============================================================================

#[test]
fn error_code_names() {
    assert_eq!(ErrorCode::NoPluginContentAndValue.as_str(), "NO_PLUGIN_CONTENT_AND_VALUE");
    assert_eq!(ErrorCode::MacroError.to_string(), "MACRO_ERROR");
    assert_eq!(ErrorCode::from_name("PLUGIN_NOT_FOUND"), Some(ErrorCode::PluginNotFound));
    assert_eq!(ErrorCode::from_name("plugin_not_found"), None);
}

#[test]
fn template_error_codes_and_phases() {
    let cycle = TemplateError::ReferenceCycle {
        chain: vec!["A".into(), "A".into()],
    };
    assert_eq!(cycle.code(), ErrorCode::ReferenceCycle);
    assert!(cycle.is_build_error());

    let plugin = TemplateError::PluginError {
        name: "USER".into(),
        message: "timeout".into(),
    };
    assert_eq!(plugin.code(), ErrorCode::PluginError);
    assert!(!plugin.is_build_error());

    let syntax = parse_template("$(USER").unwrap_err();
    assert_eq!(syntax.code(), ErrorCode::NoPluginContent);
    assert!(syntax.is_build_error());
}

// =============================================================================
// Display
// =============================================================================

#[test]
fn syntax_error_display() {
    let err = parse_template("$()").unwrap_err();
    assert_snapshot!(err.to_string(), @"NO_PLUGIN_NAME at 1:3: plugin name is empty");
}

#[test]
fn string_not_found_display() {
    let err = TemplateError::StringNotFound {
        id: "GRETING".into(),
        suggestions: vec!["GREETING".into()],
    };
    assert_snapshot!(err.to_string(), @"string not found: 'GRETING' (did you mean: GREETING?)");

    let err = TemplateError::StringNotFound {
        id: "NOPE".into(),
        suggestions: vec![],
    };
    assert_snapshot!(err.to_string(), @"string not found: 'NOPE'");
}

#[test]
fn reference_cycle_display() {
    let err = TemplateError::ReferenceCycle {
        chain: vec!["A".into(), "B".into(), "A".into()],
    };
    assert_snapshot!(err.to_string(), @"cyclic string reference: A -> B -> A");
}

#[test]
fn macro_errors_display() {
    let err = TemplateError::MacroNotFound {
        group: "USER".into(),
        key: "NAM".into(),
        suggestions: vec!["NAME".into()],
    };
    assert_snapshot!(err.to_string(), @"macro not found: '%USER:NAM%' (did you mean: NAME?)");

    let err = TemplateError::MacroError {
        plugin: "SONG".into(),
        message: "no song playing".into(),
    };
    assert_snapshot!(err.to_string(), @"macro plugin 'SONG' failed: no song playing");
}

#[test]
fn plugin_errors_display() {
    let err = TemplateError::PluginNotFound {
        name: "USR".into(),
        suggestions: vec!["USER".into(), "USERS".into()],
    };
    assert_snapshot!(err.to_string(), @"plugin not found: 'USR' (did you mean: USER, USERS?)");

    let err = TemplateError::PluginError {
        name: "FOLLOWAGE".into(),
        message: "api down".into(),
    };
    assert_snapshot!(err.to_string(), @"plugin 'FOLLOWAGE' failed: api down");
}

#[test]
fn registry_errors_display() {
    let err = RegistryError::DuplicateId {
        registry: "plugin",
        id: "USER".into(),
    };
    assert_snapshot!(err.to_string(), @"duplicate plugin id 'USER'");

    let err = RegistryError::UnknownOverride {
        id: "GRETING".into(),
        suggestions: vec!["GREETING".into()],
    };
    assert_snapshot!(err.to_string(), @"override for unknown string 'GRETING' (did you mean: GREETING?)");

    let err = RegistryError::InvalidTemplate {
        id: "A".into(),
        source: parse_template("$()").unwrap_err(),
    };
    assert_snapshot!(err.to_string(), @"invalid template for string 'A': NO_PLUGIN_NAME at 1:3: plugin name is empty");
}

#[test]
fn load_error_io_displays_path() {
    let err = LoadError::Io {
        path: PathBuf::from("/path/to/replies.strings"),
        source: io::Error::new(ErrorKind::NotFound, "file not found"),
    };
    let msg = err.to_string();
    assert!(msg.contains("/path/to/replies.strings"));
    assert!(msg.contains("file not found"));
}

#[test]
fn load_error_parse_displays_location() {
    let err = LoadError::Parse {
        path: PathBuf::from("strings/en.strings"),
        line: 42,
        column: 15,
        message: "unexpected character: 'x'".to_string(),
    };
    assert_snapshot!(err.to_string(), @"strings/en.strings:42:15: unexpected character: 'x'");
}
