use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::model::{AnswerLedger, Skill, SkillId, SkillSummary, summarize};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no skills in catalog for domain {domain:?}")]
    UnknownDomain { domain: String },

    #[error("assessment already completed")]
    Completed,

    #[error("saved index {index} is beyond the catalog length {len}")]
    SnapshotOutOfRange { index: usize, len: usize },
}

/// Scope of one assessment run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssessmentMode {
    /// Walk the entire catalog. Only these runs are committed to history.
    Full,
    /// Walk a single domain. Never committed to history.
    Domain(String),
}

impl AssessmentMode {
    #[must_use]
    pub fn is_full(&self) -> bool {
        matches!(self, AssessmentMode::Full)
    }
}

/// Outcome of a single `advance` step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the next skill within the same domain.
    Moved,
    /// Moved to the next skill and crossed a domain boundary; the break
    /// interstitial is now showing.
    DomainBoundary { finished: String },
    /// The run is complete (or already was).
    Completed,
}

/// Resumable snapshot of an in-progress run.
///
/// Created only by an explicit save action, never continuously. Carries no
/// mode: only full runs are saved and restored.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub current_index: usize,
    pub answers: AnswerLedger,
    pub progress_percent: u8,
    pub saved_at: DateTime<Utc>,
}

/// In-memory state machine for one assessment run.
///
/// The active skill sequence is fixed at start; switching scope means
/// starting a fresh session. Position `len` is the completion sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentSession {
    skills: Vec<Skill>,
    mode: AssessmentMode,
    current: usize,
    answers: AnswerLedger,
    showing_break: bool,
    finished_domain: Option<String>,
    pending_commit: bool,
}

impl AssessmentSession {
    /// Start a run over the full catalog.
    #[must_use]
    pub fn start_full(catalog: &Catalog) -> Self {
        Self::with_skills(catalog.skills().to_vec(), AssessmentMode::Full)
    }

    /// Start a run restricted to one domain.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownDomain` when the catalog has no skills
    /// for the domain.
    pub fn start_domain(catalog: &Catalog, domain: &str) -> Result<Self, SessionError> {
        let skills = catalog.domain_skills(domain);
        if skills.is_empty() {
            return Err(SessionError::UnknownDomain {
                domain: domain.to_owned(),
            });
        }
        Ok(Self::with_skills(
            skills,
            AssessmentMode::Domain(domain.to_owned()),
        ))
    }

    /// Rebuild a full-catalog run from a saved snapshot, verbatim.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SnapshotOutOfRange` when the saved position
    /// does not fit the current catalog (the source data changed between
    /// sessions).
    pub fn resume(catalog: &Catalog, snapshot: &ProgressSnapshot) -> Result<Self, SessionError> {
        let len = catalog.len();
        if snapshot.current_index > len {
            return Err(SessionError::SnapshotOutOfRange {
                index: snapshot.current_index,
                len,
            });
        }

        let mut session = Self::with_skills(catalog.skills().to_vec(), AssessmentMode::Full);
        session.current = snapshot.current_index;
        session.answers = snapshot.answers.clone();
        session.pending_commit = snapshot.current_index == len;
        Ok(session)
    }

    fn with_skills(skills: Vec<Skill>, mode: AssessmentMode) -> Self {
        Self {
            skills,
            mode,
            current: 0,
            answers: AnswerLedger::new(),
            showing_break: false,
            finished_domain: None,
            pending_commit: false,
        }
    }

    //
    // ─── OPERATIONS ────────────────────────────────────────────────────────
    //

    /// Record an answer. Re-answering a skill replaces the prior answer.
    ///
    /// Callers are trusted to pass ids from the active sequence; an id
    /// outside it is accepted but has no aggregation effect.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` once the run is finished.
    pub fn answer(&mut self, skill_id: SkillId, has_skill: bool) -> Result<(), SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        self.answers.record(skill_id, has_skill);
        Ok(())
    }

    /// Move to the next skill, or complete the run at the end.
    ///
    /// Crossing a domain boundary raises the break interstitial until
    /// `acknowledge_break` is called. Advancing a completed run is a no-op.
    pub fn advance(&mut self) -> Advance {
        let len = self.skills.len();
        if self.current >= len {
            return Advance::Completed;
        }
        if self.current == len - 1 {
            self.current = len;
            self.pending_commit = true;
            return Advance::Completed;
        }

        let previous_domain = self.skills[self.current].domain().to_owned();
        self.current += 1;
        if self.skills[self.current].domain() != previous_domain {
            self.showing_break = true;
            self.finished_domain = Some(previous_domain.clone());
            return Advance::DomainBoundary {
                finished: previous_domain,
            };
        }
        Advance::Moved
    }

    /// Step back one skill, floored at 0. Answers stay in place until
    /// re-answered. Stepping back from the completion sentinel re-enters
    /// the run at its last skill.
    pub fn retreat(&mut self) {
        if self.current > 0 {
            self.current -= 1;
        }
    }

    /// Dismiss the break interstitial (explicit "continue" action).
    pub fn acknowledge_break(&mut self) {
        self.showing_break = false;
    }

    /// Mark the completed result as committed to history (or deliberately
    /// skipped), so it is not committed again.
    pub fn mark_committed(&mut self) {
        self.pending_commit = false;
    }

    //
    // ─── STATE ─────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn mode(&self) -> &AssessmentMode {
        &self.mode
    }

    /// The active skill sequence for this run.
    #[must_use]
    pub fn active_skills(&self) -> &[Skill] {
        &self.skills
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerLedger {
        &self.answers
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_skill(&self) -> Option<&Skill> {
        self.skills.get(self.current)
    }

    #[must_use]
    pub fn total_skills(&self) -> usize {
        self.skills.len()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current >= self.skills.len()
    }

    #[must_use]
    pub fn showing_break(&self) -> bool {
        self.showing_break
    }

    /// Domain that finished just before the current break, for the break
    /// message.
    #[must_use]
    pub fn finished_domain(&self) -> Option<&str> {
        self.finished_domain.as_deref()
    }

    /// True when the run completed but its result was not yet committed.
    #[must_use]
    pub fn pending_commit(&self) -> bool {
        self.pending_commit
    }

    /// Progress through the run, 0–100.
    ///
    /// Derived from the position rather than stored, so it can never drift
    /// out of sync: `round(position / total * 100)`, forced to 100 at and
    /// after completion, 0 before the first advance.
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        let len = self.skills.len();
        if len == 0 || self.current >= len {
            return if len == 0 { 0 } else { 100 };
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            ((self.current as f64 / len as f64) * 100.0).round() as u8
        }
    }

    /// Aggregate the answers given so far over the active subset.
    #[must_use]
    pub fn summaries(&self) -> Vec<SkillSummary> {
        summarize(&self.skills, &self.answers)
    }

    /// Capture a resumable snapshot of the current position and answers.
    #[must_use]
    pub fn snapshot(&self, saved_at: DateTime<Utc>) -> ProgressSnapshot {
        ProgressSnapshot {
            current_index: self.current,
            answers: self.answers.clone(),
            progress_percent: self.progress_percent(),
            saved_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LevelTally, SkillEntry, SkillLevel};
    use crate::time::fixed_now;

    fn four_skill_catalog() -> Catalog {
        Catalog::from_entries(vec![
            SkillEntry::new("Infra", "Server", SkillLevel::Beginner, "Basic setup"),
            SkillEntry::new("Infra", "Server", SkillLevel::Intermediate, "HA design"),
            SkillEntry::new("Dev", "Programming", SkillLevel::Beginner, "Basic coding"),
            SkillEntry::new("Dev", "Programming", SkillLevel::Advanced, "Tech selection"),
        ])
        .unwrap()
    }

    #[test]
    fn full_run_progress_sequence() {
        let catalog = four_skill_catalog();
        let mut session = AssessmentSession::start_full(&catalog);
        assert_eq!(session.progress_percent(), 0);

        let mut observed = Vec::new();
        for _ in 0..4 {
            let id = session.current_skill().unwrap().id();
            session.answer(id, true).unwrap();
            session.advance();
            observed.push(session.progress_percent());
        }

        assert_eq!(observed, vec![25, 50, 75, 100]);
        assert!(session.is_complete());
        assert!(session.pending_commit());

        let summaries = session.summaries();
        let infra = &summaries[0];
        assert_eq!(infra.category, "Infra");
        assert_eq!(infra.beginner, LevelTally::new(1, 1));
        assert_eq!(infra.intermediate, LevelTally::new(1, 1));
        assert_eq!(infra.advanced, LevelTally::new(0, 0));
    }

    #[test]
    fn progress_is_monotonic_across_advances() {
        let catalog = four_skill_catalog();
        let mut session = AssessmentSession::start_full(&catalog);

        let mut last = session.progress_percent();
        for _ in 0..6 {
            session.advance();
            let now = session.progress_percent();
            assert!(now >= last);
            last = now;
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn boundary_crossing_raises_break() {
        let catalog = four_skill_catalog();
        let mut session = AssessmentSession::start_full(&catalog);

        assert_eq!(session.advance(), Advance::Moved);
        assert!(!session.showing_break());

        let outcome = session.advance();
        assert_eq!(
            outcome,
            Advance::DomainBoundary {
                finished: "Infra".to_owned()
            }
        );
        assert!(session.showing_break());
        assert_eq!(session.finished_domain(), Some("Infra"));

        session.acknowledge_break();
        assert!(!session.showing_break());
    }

    #[test]
    fn advance_after_completion_is_noop() {
        let catalog = four_skill_catalog();
        let mut session = AssessmentSession::start_full(&catalog);
        for _ in 0..4 {
            session.advance();
        }
        assert!(session.is_complete());
        assert_eq!(session.advance(), Advance::Completed);
        assert_eq!(session.current_index(), 4);
        assert_eq!(session.progress_percent(), 100);
    }

    #[test]
    fn retreat_at_zero_is_noop() {
        let catalog = four_skill_catalog();
        let mut session = AssessmentSession::start_full(&catalog);
        session.retreat();
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.progress_percent(), 0);
    }

    #[test]
    fn retreat_keeps_prior_answer() {
        let catalog = four_skill_catalog();
        let mut session = AssessmentSession::start_full(&catalog);
        let first = session.current_skill().unwrap().id();
        session.answer(first, true).unwrap();
        session.advance();
        session.retreat();

        assert_eq!(session.answers().get(first), Some(true));
        session.answer(first, false).unwrap();
        assert_eq!(session.answers().get(first), Some(false));
    }

    #[test]
    fn answer_after_completion_errs() {
        let catalog = four_skill_catalog();
        let mut session = AssessmentSession::start_full(&catalog);
        for _ in 0..4 {
            session.advance();
        }
        let err = session.answer(SkillId::new(1), true).unwrap_err();
        assert_eq!(err, SessionError::Completed);
    }

    #[test]
    fn domain_run_covers_only_that_domain() {
        let catalog = four_skill_catalog();
        let mut session = AssessmentSession::start_domain(&catalog, "Dev").unwrap();
        assert_eq!(session.total_skills(), 2);
        assert!(!session.mode().is_full());

        session.advance();
        assert_eq!(session.advance(), Advance::Completed);
        assert!(session.is_complete());
    }

    #[test]
    fn unknown_domain_errs() {
        let catalog = four_skill_catalog();
        let err = AssessmentSession::start_domain(&catalog, "QA").unwrap_err();
        assert_eq!(
            err,
            SessionError::UnknownDomain {
                domain: "QA".to_owned()
            }
        );
    }

    #[test]
    fn snapshot_round_trips_through_resume() {
        let catalog = four_skill_catalog();
        let mut session = AssessmentSession::start_full(&catalog);
        let first = session.current_skill().unwrap().id();
        session.answer(first, true).unwrap();
        session.advance();

        let snapshot = session.snapshot(fixed_now());
        let resumed = AssessmentSession::resume(&catalog, &snapshot).unwrap();

        assert_eq!(resumed.current_index(), snapshot.current_index);
        assert_eq!(resumed.answers(), &snapshot.answers);
        assert_eq!(resumed.progress_percent(), snapshot.progress_percent);
    }

    #[test]
    fn resume_rejects_out_of_range_snapshot() {
        let catalog = four_skill_catalog();
        let snapshot = ProgressSnapshot {
            current_index: 9,
            answers: AnswerLedger::new(),
            progress_percent: 100,
            saved_at: fixed_now(),
        };
        let err = AssessmentSession::resume(&catalog, &snapshot).unwrap_err();
        assert_eq!(err, SessionError::SnapshotOutOfRange { index: 9, len: 4 });
    }
}
