//! Common types used across auditlens

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// The normalized, always-valid result of parsing one audit report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalReport {
    /// Design score in `0..=100`, `None` when no score could be located
    pub score: Option<u8>,
    /// Page speed score in `0..=100`, independent of `score`
    pub page_speed_score: Option<u8>,
    pub sections: Sections,
    pub recommendations: Vec<String>,
    pub checklist: Vec<ChecklistItem>,
}

/// One row of the audit checklist table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub category: String,
    pub status: String,
}

impl ChecklistItem {
    pub fn new(category: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            status: status.into(),
        }
    }
}

/// Named prose sections, kept in the order they were first seen.
///
/// Names are unique: inserting a name that already exists appends the new
/// content to the existing entry, separated by a blank line. Serializes as a
/// JSON object with keys in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    entries: Vec<(String, String)>,
}

impl Sections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a section. Blank names are ignored.
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        let content = content.into();

        match self.entries.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, existing)) => {
                if existing.is_empty() {
                    *existing = content;
                } else if !content.is_empty() {
                    existing.push_str("\n\n");
                    existing.push_str(&content);
                }
            }
            None => self.entries.push((name.to_string(), content)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, content)| content.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, content)| (name.as_str(), content.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Sections {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, content) in &self.entries {
            map.serialize_entry(name, content)?;
        }
        map.end()
    }
}

impl<N: Into<String>, C: Into<String>> FromIterator<(N, C)> for Sections {
    fn from_iter<I: IntoIterator<Item = (N, C)>>(iter: I) -> Self {
        let mut sections = Sections::new();
        for (name, content) in iter {
            sections.insert(name, content);
        }
        sections
    }
}
