use bon::Builder;
use serde::{Deserialize, Serialize};

/// A string table entry: a default reply template plus optional metadata.
///
/// # Example
///
/// ```
/// use chirp::StringEntry;
///
/// let entry = StringEntry::builder()
///     .id("COMMAND_HELLO")
///     .template("Hello $(USER)!")
///     .description("Reply to !hello")
///     .build();
///
/// assert_eq!(entry.id, "COMMAND_HELLO");
/// assert_eq!(entry.description.as_deref(), Some("Reply to !hello"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(on(String, into))]
pub struct StringEntry {
    /// Unique id used by references and lookups.
    pub id: String,

    /// Default template text.
    pub template: String,

    /// Human readable description of where the string is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl StringEntry {
    /// Create an entry without a description.
    pub fn new(id: impl Into<String>, template: impl Into<String>) -> Self {
        StringEntry {
            id: id.into(),
            template: template.into(),
            description: None,
        }
    }
}
