//! Persisted shapes for the domain types.
//!
//! These mirror the domain so the gateway can serialize with `serde_json`
//! without leaking storage concerns into the domain layer. Validation
//! happens on the way back into domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use assess_core::model::{
    AnswerLedger, AssessmentRun, LevelCounts, LevelTally, RunId, SkillId, SkillSummary,
};
use assess_core::session::ProgressSnapshot;

use crate::kv::StorageError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub skill_id: SkillId,
    pub has_skill: bool,
}

pub(crate) fn answers_to_records(ledger: &AnswerLedger) -> Vec<AnswerRecord> {
    ledger
        .iter()
        .map(|(skill_id, has_skill)| AnswerRecord { skill_id, has_skill })
        .collect()
}

pub(crate) fn records_to_answers(records: &[AnswerRecord]) -> AnswerLedger {
    let mut ledger = AnswerLedger::new();
    for record in records {
        ledger.record(record.skill_id, record.has_skill);
    }
    ledger
}

/// Persisted shape of one (category, item) summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub category: String,
    pub item: String,
    pub beginner_acquired: u32,
    pub beginner_total: u32,
    pub intermediate_acquired: u32,
    pub intermediate_total: u32,
    pub advanced_acquired: u32,
    pub advanced_total: u32,
}

impl SummaryRecord {
    #[must_use]
    pub fn from_summary(summary: &SkillSummary) -> Self {
        Self {
            category: summary.category.clone(),
            item: summary.item.clone(),
            beginner_acquired: summary.beginner.acquired,
            beginner_total: summary.beginner.total,
            intermediate_acquired: summary.intermediate.acquired,
            intermediate_total: summary.intermediate.total,
            advanced_acquired: summary.advanced.acquired,
            advanced_total: summary.advanced.total,
        }
    }

    #[must_use]
    pub fn into_summary(self) -> SkillSummary {
        SkillSummary {
            category: self.category,
            item: self.item,
            beginner: LevelTally::new(self.beginner_acquired, self.beginner_total),
            intermediate: LevelTally::new(self.intermediate_acquired, self.intermediate_total),
            advanced: LevelTally::new(self.advanced_acquired, self.advanced_total),
        }
    }
}

/// Per-level aggregate counts over the entire catalog.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LevelCountsRecord {
    pub beginner_acquired: u32,
    pub beginner_total: u32,
    pub intermediate_acquired: u32,
    pub intermediate_total: u32,
    pub advanced_acquired: u32,
    pub advanced_total: u32,
}

impl LevelCountsRecord {
    #[must_use]
    pub fn from_counts(counts: LevelCounts) -> Self {
        Self {
            beginner_acquired: counts.beginner.acquired,
            beginner_total: counts.beginner.total,
            intermediate_acquired: counts.intermediate.acquired,
            intermediate_total: counts.intermediate.total,
            advanced_acquired: counts.advanced.acquired,
            advanced_total: counts.advanced.total,
        }
    }

    #[must_use]
    pub fn into_counts(self) -> LevelCounts {
        LevelCounts {
            beginner: LevelTally::new(self.beginner_acquired, self.beginner_total),
            intermediate: LevelTally::new(self.intermediate_acquired, self.intermediate_total),
            advanced: LevelTally::new(self.advanced_acquired, self.advanced_total),
        }
    }
}

/// Persisted shape of the in-progress snapshot. At most one exists at a
/// time; every save overwrites it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub current_index: usize,
    pub answers: Vec<AnswerRecord>,
    pub progress_percent: u8,
    pub saved_at: DateTime<Utc>,
}

impl ProgressRecord {
    #[must_use]
    pub fn from_snapshot(snapshot: &ProgressSnapshot) -> Self {
        Self {
            current_index: snapshot.current_index,
            answers: answers_to_records(&snapshot.answers),
            progress_percent: snapshot.progress_percent,
            saved_at: snapshot.saved_at,
        }
    }

    #[must_use]
    pub fn into_snapshot(self) -> ProgressSnapshot {
        ProgressSnapshot {
            current_index: self.current_index,
            answers: records_to_answers(&self.answers),
            progress_percent: self.progress_percent,
            saved_at: self.saved_at,
        }
    }
}

/// Persisted shape of one completed assessment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: String,
    pub completed_at: DateTime<Utc>,
    pub results: Vec<SummaryRecord>,
    pub answers: Vec<AnswerRecord>,
    pub total_skills: u32,
    pub completion_rate: f64,
    pub skill_counts: LevelCountsRecord,
}

impl AssessmentRecord {
    #[must_use]
    pub fn from_run(run: &AssessmentRun) -> Self {
        Self {
            id: run.id().as_str().to_owned(),
            completed_at: run.completed_at(),
            results: run.results().iter().map(SummaryRecord::from_summary).collect(),
            answers: answers_to_records(run.answers()),
            total_skills: run.total_skills(),
            completion_rate: run.completion_rate(),
            skill_counts: LevelCountsRecord::from_counts(run.level_counts()),
        }
    }

    /// Convert the record back into a domain run.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored counts violate
    /// the domain invariants.
    pub fn into_run(self) -> Result<AssessmentRun, StorageError> {
        AssessmentRun::from_persisted(
            RunId::from_string(self.id),
            self.completed_at,
            self.results.into_iter().map(SummaryRecord::into_summary).collect(),
            records_to_answers(&self.answers),
            self.total_skills,
            self.completion_rate,
            self.skill_counts.into_counts(),
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

/// Top-level persisted profile. History lives inside it as an append-only
/// list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: String,
    pub history: Vec<AssessmentRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::model::summarize;
    use assess_core::time::fixed_now;

    #[test]
    fn progress_record_round_trips() {
        let mut answers = AnswerLedger::new();
        answers.record(SkillId::new(1), true);
        answers.record(SkillId::new(2), false);
        let snapshot = ProgressSnapshot {
            current_index: 2,
            answers,
            progress_percent: 50,
            saved_at: fixed_now(),
        };

        let json = serde_json::to_string(&ProgressRecord::from_snapshot(&snapshot)).unwrap();
        let restored: ProgressRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.into_snapshot(), snapshot);
    }

    #[test]
    fn assessment_record_round_trips() {
        let mut answers = AnswerLedger::new();
        answers.record(SkillId::new(1), true);
        let results = summarize(&[], &answers);
        let run = AssessmentRun::new(fixed_now(), results, answers, 4, LevelCounts::default());

        let json = serde_json::to_string(&AssessmentRecord::from_run(&run)).unwrap();
        let restored: AssessmentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.into_run().unwrap(), run);
    }

    #[test]
    fn corrupt_counts_fail_rehydration() {
        let record = AssessmentRecord {
            id: "assessment_1".to_owned(),
            completed_at: fixed_now(),
            results: vec![SummaryRecord {
                category: "Infra".to_owned(),
                item: "Server".to_owned(),
                beginner_acquired: 5,
                beginner_total: 2,
                intermediate_acquired: 0,
                intermediate_total: 0,
                advanced_acquired: 0,
                advanced_total: 0,
            }],
            answers: Vec::new(),
            total_skills: 2,
            completion_rate: 0.0,
            skill_counts: LevelCountsRecord::from_counts(LevelCounts::default()),
        };
        assert!(matches!(
            record.into_run().unwrap_err(),
            StorageError::Serialization(_)
        ));
    }
}
