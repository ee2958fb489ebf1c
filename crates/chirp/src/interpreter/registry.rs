//! String table for storing and looking up reply templates.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs;
use std::path::Path;

use crate::interpreter::error::compute_suggestions;
use crate::interpreter::{LoadError, RegistryError};
use crate::parser::ast::{StringDefinition, Template};
use crate::parser::{ParseError, parse_strings_file, parse_template};
use crate::types::StringEntry;

/// A string table entry together with its parsed, effective template.
#[derive(Debug, Clone)]
struct StoredString {
    entry: StringEntry,
    /// Custom template replacing the entry's default, if any.
    custom: Option<String>,
    /// Parsed form of the effective template.
    parsed: Template,
}

impl StoredString {
    fn effective_template(&self) -> &str {
        self.custom.as_deref().unwrap_or(&self.entry.template)
    }
}

/// An immutable table of reply templates indexed by id.
///
/// Every template is parsed when the table is built, so a table that exists
/// contains only syntactically valid templates. Custom overrides produce a
/// new table rather than mutating an existing one.
///
/// # Example
///
/// ```
/// use chirp::{StringEntry, StringTable};
///
/// let strings = StringTable::new([
///     StringEntry::new("GREETING", "Hello $(USER)!"),
///     StringEntry::new("COMMAND_HELLO", "$[GREETING] Welcome to the stream."),
/// ])
/// .unwrap();
///
/// assert_eq!(strings.template("GREETING"), Some("Hello $(USER)!"));
/// assert!(StringTable::new([
///     StringEntry::new("A", "x"),
///     StringEntry::new("A", "y"),
/// ])
/// .is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    strings: HashMap<String, StoredString>,
}

impl StringTable {
    /// Build a table from entries.
    ///
    /// Returns an error if an id appears more than once or a template does
    /// not parse.
    pub fn new(entries: impl IntoIterator<Item = StringEntry>) -> Result<Self, RegistryError> {
        let mut strings = HashMap::new();
        for entry in entries {
            let parsed = parse_template(&entry.template).map_err(|source| {
                RegistryError::InvalidTemplate {
                    id: entry.id.clone(),
                    source,
                }
            })?;
            match strings.entry(entry.id.clone()) {
                Entry::Occupied(existing) => {
                    return Err(RegistryError::DuplicateId {
                        registry: "string",
                        id: existing.key().clone(),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(StoredString {
                        entry,
                        custom: None,
                        parsed,
                    });
                }
            }
        }
        Ok(StringTable { strings })
    }

    /// Build a table from definitions parsed out of a string file.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = StringDefinition>,
    ) -> Result<Self, RegistryError> {
        StringTable::new(definitions.into_iter().map(|definition| StringEntry {
            id: definition.id,
            template: definition.template,
            description: definition.description,
        }))
    }

    /// Load a table from the contents of a `.strings` file.
    pub fn load_str(content: &str) -> Result<Self, LoadError> {
        StringTable::load_internal(content, Path::new("<string>"))
    }

    /// Load a table from a `.strings` file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        StringTable::load_internal(&content, path)
    }

    fn load_internal(content: &str, path: &Path) -> Result<Self, LoadError> {
        let definitions = parse_strings_file(content).map_err(|e| {
            let (line, column, message) = match e {
                ParseError::Syntax {
                    line,
                    column,
                    message,
                } => (line, column, message),
                ParseError::UnexpectedEof { line, column } => {
                    (line, column, "unexpected end of file".to_string())
                }
            };
            LoadError::Parse {
                path: path.to_path_buf(),
                line,
                column,
                message,
            }
        })?;
        StringTable::from_definitions(definitions).map_err(|source| LoadError::Registry {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Return a copy of this table in which the given ids use custom templates.
    ///
    /// Overrides replace the effective template only; the default stays
    /// available through [`StringTable::default_template`]. Returns an error
    /// for an unknown id, a repeated id, or a template that does not parse.
    pub fn with_overrides<I, K, V>(&self, overrides: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut table = self.clone();
        let mut seen: Vec<String> = Vec::new();
        for (id, template) in overrides {
            let id = id.into();
            let template = template.into();
            if seen.contains(&id) {
                return Err(RegistryError::DuplicateId {
                    registry: "override",
                    id,
                });
            }
            let ids = table.ids();
            let Some(stored) = table.strings.get_mut(&id) else {
                let suggestions = compute_suggestions(&id, &ids);
                return Err(RegistryError::UnknownOverride { id, suggestions });
            };
            stored.parsed =
                parse_template(&template).map_err(|source| RegistryError::InvalidTemplate {
                    id: id.clone(),
                    source,
                })?;
            stored.custom = Some(template);
            seen.push(id);
        }
        Ok(table)
    }

    /// Get an entry by id.
    pub fn get(&self, id: &str) -> Option<&StringEntry> {
        self.strings.get(id).map(|stored| &stored.entry)
    }

    /// Get the effective template text: the custom override, or the default.
    pub fn template(&self, id: &str) -> Option<&str> {
        self.strings.get(id).map(StoredString::effective_template)
    }

    /// Get the default template text, ignoring overrides.
    pub fn default_template(&self, id: &str) -> Option<&str> {
        self.strings.get(id).map(|stored| stored.entry.template.as_str())
    }

    /// Check if an id has a custom override.
    pub fn is_custom(&self, id: &str) -> bool {
        self.strings
            .get(id)
            .is_some_and(|stored| stored.custom.is_some())
    }

    /// Get the parsed effective template.
    pub fn parsed(&self, id: &str) -> Option<&Template> {
        self.strings.get(id).map(|stored| &stored.parsed)
    }

    /// Check if an id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.strings.contains_key(id)
    }

    /// All ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.strings.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// All entries, sorted by id.
    pub fn entries(&self) -> Vec<&StringEntry> {
        let mut entries: Vec<&StringEntry> =
            self.strings.values().map(|stored| &stored.entry).collect();
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
