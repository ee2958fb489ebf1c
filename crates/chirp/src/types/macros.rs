use std::collections::HashMap;
use std::collections::hash_map::Entry;

use super::MacroValue;
use crate::interpreter::RegistryError;

/// The key/value pairs of one macro group.
///
/// Keys are unique; inserting an existing key replaces its value.
///
/// # Example
///
/// ```
/// use chirp::MacroDictionary;
///
/// let user = MacroDictionary::new()
///     .with("NAME", "Alice")
///     .with("POINTS", 1200)
///     .with("RANK", None::<u32>);
///
/// assert_eq!(user.get("POINTS"), Some("1200"));
/// assert_eq!(user.get("RANK"), Some("undefined"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroDictionary {
    values: HashMap<String, String>,
}

impl MacroDictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous value for the key.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<MacroValue>,
    ) -> Option<String> {
        self.values
            .insert(key.into(), value.into().into_string())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<MacroValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Iterate over all keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for MacroDictionary
where
    K: Into<String>,
    V: Into<MacroValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dictionary = MacroDictionary::new();
        for (key, value) in iter {
            dictionary.insert(key, value);
        }
        dictionary
    }
}

/// Macro groups available while evaluating a template.
///
/// A macro map is built fresh for every reply from live data and discarded
/// once the reply has been rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroMap {
    groups: HashMap<String, MacroDictionary>,
}

impl MacroMap {
    /// Create an empty macro map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a macro map from a list of groups.
    ///
    /// Returns an error if a group id appears more than once.
    pub fn from_groups<I, S>(groups: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (S, MacroDictionary)>,
        S: Into<String>,
    {
        let mut map = MacroMap::new();
        for (id, dictionary) in groups {
            map.try_insert(id, dictionary)?;
        }
        Ok(map)
    }

    /// Insert a group, failing if the group id is already present.
    pub fn try_insert(
        &mut self,
        id: impl Into<String>,
        dictionary: MacroDictionary,
    ) -> Result<(), RegistryError> {
        match self.groups.entry(id.into()) {
            Entry::Occupied(entry) => Err(RegistryError::DuplicateId {
                registry: "macro group",
                id: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(dictionary);
                Ok(())
            }
        }
    }

    /// Builder-style insert that replaces an existing group of the same id.
    pub fn with_group(mut self, id: impl Into<String>, dictionary: MacroDictionary) -> Self {
        self.groups.insert(id.into(), dictionary);
        self
    }

    /// Look up a group by id.
    pub fn group(&self, id: &str) -> Option<&MacroDictionary> {
        self.groups.get(id)
    }

    /// Look up a single macro value.
    pub fn get(&self, group: &str, key: &str) -> Option<&str> {
        self.group(group).and_then(|dictionary| dictionary.get(key))
    }

    /// Iterate over all group ids.
    pub fn group_ids(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if the map has no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
