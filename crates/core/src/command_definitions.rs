use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A saved shell command with its metadata.
///
/// Tags keep the case they were stored with; comparisons elsewhere are
/// case-insensitive.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CommandDefinition {
    pub id: u32,
    pub command: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub created_at: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub used_count: u64,
}

impl CommandDefinition {
    /// True if any of `wanted` matches one of this command's tags, ignoring case.
    #[must_use]
    pub fn has_any_tag(&self, wanted: &[String]) -> bool {
        wanted.iter().any(|tag| {
            self.tags
                .iter()
                .any(|own| own.to_lowercase() == tag.to_lowercase())
        })
    }

    /// True if `query` (already lowercased) occurs in the command or description.
    #[must_use]
    pub fn matches_query(&self, lowercase_query: &str) -> bool {
        self.command.to_lowercase().contains(lowercase_query)
            || self.description.to_lowercase().contains(lowercase_query)
    }

    #[must_use]
    pub fn joined_tags(&self) -> String {
        self.tags.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }
}

impl Display for CommandDefinition {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        if self.description.is_empty() {
            write!(formatter, "[{}] {}", self.id, self.command)
        } else {
            write!(formatter, "[{}] {} ({})", self.id, self.description, self.command)
        }
    }
}

/// Result of an add: the stored command plus what the add changed.
///
/// `updated` is false for a freshly created command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub command: CommandDefinition,
    pub created: bool,
    pub updated: bool,
    pub merged_tags: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub tags: BTreeSet<String>,
    pub most_used: Vec<CommandDefinition>,
}

/// Ordering for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListSort {
    /// Newest created first.
    #[default]
    Created,
    /// Most recently used first, never-used last.
    Recent,
    /// Highest use count first.
    Used,
}
