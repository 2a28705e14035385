use std::collections::HashMap;

use crate::model::{AnswerLedger, Skill, SkillLevel};

/// Acquired/total counts for one level of one (category, item) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelTally {
    pub acquired: u32,
    pub total: u32,
}

impl LevelTally {
    #[must_use]
    pub fn new(acquired: u32, total: u32) -> Self {
        Self { acquired, total }
    }

    /// Acquired ratio in `[0.0, 1.0]`. An empty level (0/0) is 0.0, never
    /// NaN; renderers rely on this.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.acquired) / f64::from(self.total)
        }
    }
}

/// Aggregated counts for one (category, item) pair, split by level.
///
/// Derived from a skill subset and an answer ledger; never stored on its
/// own, always recomputed on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillSummary {
    pub category: String,
    pub item: String,
    pub beginner: LevelTally,
    pub intermediate: LevelTally,
    pub advanced: LevelTally,
}

impl SkillSummary {
    /// Sum of acquired counts across all three levels.
    #[must_use]
    pub fn acquired_total(&self) -> u32 {
        self.beginner.acquired + self.intermediate.acquired + self.advanced.acquired
    }

    #[must_use]
    pub fn tally(&self, level: SkillLevel) -> LevelTally {
        match level {
            SkillLevel::Beginner => self.beginner,
            SkillLevel::Intermediate => self.intermediate,
            SkillLevel::Advanced => self.advanced,
        }
    }

    fn tally_mut(&mut self, level: SkillLevel) -> &mut LevelTally {
        match level {
            SkillLevel::Beginner => &mut self.beginner,
            SkillLevel::Intermediate => &mut self.intermediate,
            SkillLevel::Advanced => &mut self.advanced,
        }
    }
}

/// Per-level tallies over a whole skill set, independent of category/item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelCounts {
    pub beginner: LevelTally,
    pub intermediate: LevelTally,
    pub advanced: LevelTally,
}

/// Aggregate a skill subset against an answer ledger.
///
/// Produces one `SkillSummary` per distinct (category, item) pair, in
/// first-occurrence order of the subset. Consumers display summaries in
/// exactly this order, so it is part of the contract. Pure and idempotent:
/// identical inputs always yield identical output.
#[must_use]
pub fn summarize(skills: &[Skill], ledger: &AnswerLedger) -> Vec<SkillSummary> {
    let mut out: Vec<SkillSummary> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for skill in skills {
        let key = (skill.domain().to_owned(), skill.item().to_owned());
        let pos = *index.entry(key).or_insert_with(|| {
            out.push(SkillSummary {
                category: skill.domain().to_owned(),
                item: skill.item().to_owned(),
                beginner: LevelTally::default(),
                intermediate: LevelTally::default(),
                advanced: LevelTally::default(),
            });
            out.len() - 1
        });

        let tally = out[pos].tally_mut(skill.level());
        tally.total += 1;
        if ledger.is_acquired(skill.id()) {
            tally.acquired += 1;
        }
    }

    out
}

/// Per-level acquired/total counts over the given skill set.
///
/// History records use this over the entire catalog, never a domain subset.
#[must_use]
pub fn level_totals(skills: &[Skill], ledger: &AnswerLedger) -> LevelCounts {
    let mut counts = LevelCounts::default();
    for skill in skills {
        let tally = match skill.level() {
            SkillLevel::Beginner => &mut counts.beginner,
            SkillLevel::Intermediate => &mut counts.intermediate,
            SkillLevel::Advanced => &mut counts.advanced,
        };
        tally.total += 1;
        if ledger.is_acquired(skill.id()) {
            tally.acquired += 1;
        }
    }
    counts
}
