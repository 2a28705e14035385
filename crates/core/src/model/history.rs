use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::{AnswerLedger, LevelCounts, SkillSummary};

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum HistoryError {
    #[error("acquired count {acquired} exceeds total {total} for {context}")]
    TallyOutOfRange {
        context: String,
        acquired: u32,
        total: u32,
    },

    #[error("completion rate {0} is outside 0..=100")]
    InvalidCompletionRate(f64),
}

/// Time-derived unique token identifying one completed assessment run.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    /// Derive a run id from the completion timestamp.
    #[must_use]
    pub fn at(completed_at: DateTime<Utc>) -> Self {
        Self(format!("assessment_{}", completed_at.timestamp_millis()))
    }

    #[must_use]
    pub fn from_string(raw: String) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RunId({})", self.0)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One completed full assessment, as committed to history.
///
/// Immutable once created. Only full-catalog runs are ever committed;
/// domain-filtered runs never reach history.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentRun {
    id: RunId,
    completed_at: DateTime<Utc>,
    results: Vec<SkillSummary>,
    answers: AnswerLedger,
    total_skills: u32,
    completion_rate: f64,
    level_counts: LevelCounts,
}

impl AssessmentRun {
    /// Build a run at completion time. `completion_rate` is derived as the
    /// percentage of answered skills over the whole catalog.
    #[must_use]
    pub fn new(
        completed_at: DateTime<Utc>,
        results: Vec<SkillSummary>,
        answers: AnswerLedger,
        total_skills: u32,
        level_counts: LevelCounts,
    ) -> Self {
        let completion_rate = if total_skills == 0 {
            0.0
        } else {
            answers.len() as f64 / f64::from(total_skills) * 100.0
        };
        Self {
            id: RunId::at(completed_at),
            completed_at,
            results,
            answers,
            total_skills,
            completion_rate,
            level_counts,
        }
    }

    /// Rehydrate a run from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError` if any tally has `acquired > total` or the
    /// completion rate is out of range.
    pub fn from_persisted(
        id: RunId,
        completed_at: DateTime<Utc>,
        results: Vec<SkillSummary>,
        answers: AnswerLedger,
        total_skills: u32,
        completion_rate: f64,
        level_counts: LevelCounts,
    ) -> Result<Self, HistoryError> {
        for summary in &results {
            for (label, tally) in [
                ("beginner", summary.beginner),
                ("intermediate", summary.intermediate),
                ("advanced", summary.advanced),
            ] {
                if tally.acquired > tally.total {
                    return Err(HistoryError::TallyOutOfRange {
                        context: format!("{}/{} {label}", summary.category, summary.item),
                        acquired: tally.acquired,
                        total: tally.total,
                    });
                }
            }
        }
        if !(0.0..=100.0).contains(&completion_rate) {
            return Err(HistoryError::InvalidCompletionRate(completion_rate));
        }

        Ok(Self {
            id,
            completed_at,
            results,
            answers,
            total_skills,
            completion_rate,
            level_counts,
        })
    }

    #[must_use]
    pub fn id(&self) -> &RunId {
        &self.id
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Full snapshot of all summaries at completion time.
    #[must_use]
    pub fn results(&self) -> &[SkillSummary] {
        &self.results
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerLedger {
        &self.answers
    }

    #[must_use]
    pub fn total_skills(&self) -> u32 {
        self.total_skills
    }

    /// Percentage of answered skills over the whole catalog, 0..=100.
    #[must_use]
    pub fn completion_rate(&self) -> f64 {
        self.completion_rate
    }

    /// Per-level tallies over the entire catalog.
    #[must_use]
    pub fn level_counts(&self) -> LevelCounts {
        self.level_counts
    }
}

/// Delta for one (category, item) pair between two consecutive runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressComparison {
    pub category: String,
    pub item: String,
    pub previous_total: u32,
    pub current_total: u32,
    pub improvement: i64,
    pub is_improved: bool,
}

/// Compare two runs per (category, item).
///
/// Keys are taken from the newer run and looked up in the older one; keys
/// present only in the newer run are skipped, deliberately, rather than
/// reported as full improvement. Totals are the sum of acquired counts
/// across all three levels.
#[must_use]
pub fn compare_runs(latest: &AssessmentRun, previous: &AssessmentRun) -> Vec<ProgressComparison> {
    let mut comparisons = Vec::new();

    for current in latest.results() {
        let Some(prior) = previous
            .results()
            .iter()
            .find(|p| p.category == current.category && p.item == current.item)
        else {
            continue;
        };

        let current_total = current.acquired_total();
        let previous_total = prior.acquired_total();
        let improvement = i64::from(current_total) - i64::from(previous_total);

        comparisons.push(ProgressComparison {
            category: current.category.clone(),
            item: current.item.clone(),
            previous_total,
            current_total,
            improvement,
            is_improved: improvement > 0,
        });
    }

    comparisons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LevelTally;
    use crate::time::fixed_now;

    fn summary(category: &str, item: &str, acquired: u32, total: u32) -> SkillSummary {
        SkillSummary {
            category: category.to_owned(),
            item: item.to_owned(),
            beginner: LevelTally::new(acquired, total),
            intermediate: LevelTally::default(),
            advanced: LevelTally::default(),
        }
    }

    fn run(results: Vec<SkillSummary>) -> AssessmentRun {
        AssessmentRun::new(fixed_now(), results, AnswerLedger::new(), 10, LevelCounts::default())
    }

    #[test]
    fn run_id_derives_from_timestamp() {
        let now = fixed_now();
        let id = RunId::at(now);
        assert_eq!(id.as_str(), format!("assessment_{}", now.timestamp_millis()));
    }

    #[test]
    fn completion_rate_is_percent_of_answered() {
        let mut answers = AnswerLedger::new();
        answers.record(crate::model::SkillId::new(1), true);
        answers.record(crate::model::SkillId::new(2), false);

        let run = AssessmentRun::new(fixed_now(), Vec::new(), answers, 4, LevelCounts::default());
        assert!((run.completion_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn from_persisted_rejects_impossible_tally() {
        let err = AssessmentRun::from_persisted(
            RunId::at(fixed_now()),
            fixed_now(),
            vec![summary("Infra", "Server", 3, 1)],
            AnswerLedger::new(),
            10,
            50.0,
            LevelCounts::default(),
        )
        .unwrap_err();
        assert!(matches!(err, HistoryError::TallyOutOfRange { .. }));
    }

    #[test]
    fn comparison_reports_improvement() {
        let previous = run(vec![summary("Infra", "Server", 1, 3)]);
        let latest = run(vec![summary("Infra", "Server", 2, 3)]);

        let comparisons = compare_runs(&latest, &previous);
        assert_eq!(comparisons.len(), 1);
        assert_eq!(comparisons[0].previous_total, 1);
        assert_eq!(comparisons[0].current_total, 2);
        assert_eq!(comparisons[0].improvement, 1);
        assert!(comparisons[0].is_improved);
    }

    #[test]
    fn comparison_skips_keys_new_in_latest() {
        let previous = run(vec![summary("Infra", "Server", 1, 3)]);
        let latest = run(vec![
            summary("Infra", "Server", 1, 3),
            summary("Infra", "Cloud", 2, 4),
        ]);

        let comparisons = compare_runs(&latest, &previous);
        assert_eq!(comparisons.len(), 1);
        assert_eq!(comparisons[0].item, "Server");
        assert!(!comparisons[0].is_improved);
    }
}
