use thiserror::Error;

use crate::model::{Skill, SkillEntry, SkillId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog is empty")]
    Empty,

    #[error("skills for domain {domain:?} are not contiguous in the catalog")]
    DomainNotContiguous { domain: String },
}

/// One domain of the catalog together with its items, in first-occurrence
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillCategory {
    pub category: String,
    pub items: Vec<String>,
}

/// The full ordered set of skills available to the application.
///
/// Loaded once per launch and immutable for the whole session. Ids are
/// assigned here, numbered from 1 in catalog order, so they are stable as
/// long as the source data is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    skills: Vec<Skill>,
}

impl Catalog {
    /// Build a catalog from id-less source entries.
    ///
    /// Domain boundary detection during an assessment compares adjacent
    /// skills by domain, so the catalog must list each domain as one
    /// contiguous run. That is validated here, once, at load time.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Empty` for an empty entry list and
    /// `CatalogError::DomainNotContiguous` when a domain reappears after a
    /// different one.
    pub fn from_entries(entries: Vec<SkillEntry>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }

        let skills: Vec<Skill> = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                Skill::new(
                    SkillId::new(index as u64 + 1),
                    entry.domain,
                    entry.item,
                    entry.level,
                    entry.name,
                    entry.description,
                )
            })
            .collect();

        let mut seen: Vec<&str> = Vec::new();
        for skill in &skills {
            match seen.last() {
                Some(last) if *last == skill.domain() => {}
                _ => {
                    if seen.contains(&skill.domain()) {
                        return Err(CatalogError::DomainNotContiguous {
                            domain: skill.domain().to_owned(),
                        });
                    }
                    seen.push(skill.domain());
                }
            }
        }

        Ok(Self { skills })
    }

    /// All skills in catalog order.
    #[must_use]
    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Distinct domains in first-occurrence order.
    #[must_use]
    pub fn domains(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for skill in &self.skills {
            if out.last().map(String::as_str) != Some(skill.domain()) {
                out.push(skill.domain().to_owned());
            }
        }
        out
    }

    /// Ordered subset of skills belonging to one domain. Empty when the
    /// domain is unknown.
    #[must_use]
    pub fn domain_skills(&self, domain: &str) -> Vec<Skill> {
        self.skills
            .iter()
            .filter(|s| s.domain() == domain)
            .cloned()
            .collect()
    }

    /// Domains with their items, both in first-occurrence order.
    #[must_use]
    pub fn categories(&self) -> Vec<SkillCategory> {
        let mut out: Vec<SkillCategory> = Vec::new();
        for skill in &self.skills {
            let pos = match out.iter().position(|c| c.category == skill.domain()) {
                Some(pos) => pos,
                None => {
                    out.push(SkillCategory {
                        category: skill.domain().to_owned(),
                        items: Vec::new(),
                    });
                    out.len() - 1
                }
            };
            if !out[pos].items.iter().any(|i| i == skill.item()) {
                let item = skill.item().to_owned();
                out[pos].items.push(item);
            }
        }
        out
    }
}
