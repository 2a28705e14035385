use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a Skill.
///
/// Assigned once at catalog load time, in catalog order, and stable for the
/// whole session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SkillId(u64);

impl SkillId {
    /// Creates a new `SkillId`
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying u64 value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SkillId({})", self.0)
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Difficulty tier of a skill within an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillLevel::Beginner => "beginner",
            SkillLevel::Intermediate => "intermediate",
            SkillLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry of the skill catalog.
///
/// Immutable once loaded; discarded at process end and re-fetched on the
/// next launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skill {
    id: SkillId,
    domain: String,
    item: String,
    level: SkillLevel,
    name: String,
    description: Option<String>,
}

impl Skill {
    #[must_use]
    pub fn new(
        id: SkillId,
        domain: impl Into<String>,
        item: impl Into<String>,
        level: SkillLevel,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            id,
            domain: domain.into(),
            item: item.into(),
            level,
            name: name.into(),
            description,
        }
    }

    #[must_use]
    pub fn id(&self) -> SkillId {
        self.id
    }

    /// Top-level grouping, e.g. "Infrastructure Engineer".
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Second-level grouping within a domain, e.g. "Server".
    #[must_use]
    pub fn item(&self) -> &str {
        &self.item
    }

    #[must_use]
    pub fn level(&self) -> SkillLevel {
        self.level
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Draft catalog entry before an id has been assigned.
///
/// The catalog source supplies these; `Catalog::from_entries` turns them
/// into `Skill`s with ids numbered from 1 in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillEntry {
    pub domain: String,
    pub item: String,
    pub level: SkillLevel,
    pub name: String,
    pub description: Option<String>,
}

impl SkillEntry {
    #[must_use]
    pub fn new(
        domain: impl Into<String>,
        item: impl Into<String>,
        level: SkillLevel,
        name: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            item: item.into(),
            level,
            name: name.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_id_display() {
        let id = SkillId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(format!("{id:?}"), "SkillId(42)");
    }

    #[test]
    fn level_as_str() {
        assert_eq!(SkillLevel::Beginner.as_str(), "beginner");
        assert_eq!(SkillLevel::Advanced.to_string(), "advanced");
    }

    #[test]
    fn entry_builder_sets_description() {
        let entry = SkillEntry::new("Infra", "Server", SkillLevel::Beginner, "Basic setup")
            .with_description("Install and configure an OS");
        assert_eq!(entry.description.as_deref(), Some("Install and configure an OS"));
    }
}
