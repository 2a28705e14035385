use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::warn;

use assess_core::Clock;
use assess_core::catalog::Catalog;
use assess_core::model::{AssessmentRun, ProgressComparison, RunId, compare_runs, level_totals};
use assess_core::session::AssessmentSession;
use storage::repository::{HistoryRepository, ProgressRepository};

use crate::error::AssessmentError;

/// Outcome of a single `commit_result` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The run was appended to history.
    Saved(RunId),
    /// Another commit for this session is still in flight; nothing was
    /// appended.
    AlreadyInFlight,
    /// The session has no uncommitted result; nothing was appended.
    AlreadySaved,
    /// Domain-filtered runs never enter history; the pending flag was
    /// cleared so callers do not retry forever.
    SkippedPartial,
}

/// Clears the in-flight flag when a commit path unwinds, success or not.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Orchestrates assessment runs against the persistence gateway.
///
/// The service itself is stateless across runs: the session is an explicit
/// value owned by the caller and passed into each operation. In-memory
/// session state is the source of truth; persistence is a best-effort
/// mirror and its failures never roll the session back.
pub struct AssessmentService {
    catalog: Catalog,
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
    history: Arc<dyn HistoryRepository>,
    is_saving: AtomicBool,
}

impl AssessmentService {
    #[must_use]
    pub fn new(
        catalog: Catalog,
        clock: Clock,
        progress: Arc<dyn ProgressRepository>,
        history: Arc<dyn HistoryRepository>,
    ) -> Self {
        Self {
            catalog,
            clock,
            progress,
            history,
            is_saving: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    //
    // ─── SESSION LIFECYCLE ─────────────────────────────────────────────────
    //

    /// Start a run over the full catalog. Any saved snapshot is superseded
    /// and cleared, best-effort.
    pub async fn start_full(&self) -> AssessmentSession {
        self.clear_superseded_snapshot().await;
        AssessmentSession::start_full(&self.catalog)
    }

    /// Start a run over a single domain. Any saved snapshot is superseded
    /// and cleared, best-effort.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Session` when the domain is unknown.
    pub async fn start_domain(&self, domain: &str) -> Result<AssessmentSession, AssessmentError> {
        let session = AssessmentSession::start_domain(&self.catalog, domain)?;
        self.clear_superseded_snapshot().await;
        Ok(session)
    }

    /// Rebuild a session from the saved snapshot, or `None` when nothing
    /// was saved.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Storage` on gateway failures and
    /// `AssessmentError::Session` when the snapshot no longer fits the
    /// catalog.
    pub async fn resume_saved(&self) -> Result<Option<AssessmentSession>, AssessmentError> {
        let Some(snapshot) = self.progress.load().await? else {
            return Ok(None);
        };
        let session = AssessmentSession::resume(&self.catalog, &snapshot)?;
        Ok(Some(session))
    }

    //
    // ─── PROGRESS SNAPSHOTS ────────────────────────────────────────────────
    //

    /// Persist the current position and answers (explicit user action).
    ///
    /// Only full runs are saveable; a domain run is skipped silently, since
    /// a restored snapshot always re-enters the full catalog.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Storage` if the snapshot cannot be stored.
    /// The in-memory session is unaffected either way.
    pub async fn save_progress(&self, session: &AssessmentSession) -> Result<(), AssessmentError> {
        if !session.mode().is_full() {
            return Ok(());
        }
        let snapshot = session.snapshot(self.clock.now());
        self.progress.save(&snapshot).await?;
        Ok(())
    }

    /// True when a saved snapshot exists.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Storage` on gateway failures.
    pub async fn has_saved_progress(&self) -> Result<bool, AssessmentError> {
        Ok(self.progress.has_saved().await?)
    }

    /// Delete the saved snapshot (explicit user action).
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Storage` on gateway failures.
    pub async fn clear_saved_progress(&self) -> Result<(), AssessmentError> {
        self.progress.clear().await?;
        Ok(())
    }

    //
    // ─── RESULT COMMIT ─────────────────────────────────────────────────────
    //

    /// Commit a completed run to history, at most once.
    ///
    /// Two independent callers may trigger this for the same completion
    /// (for example an automatic post-completion save and a manual one);
    /// an atomic in-flight flag plus the session's pending-commit flag make
    /// the append happen exactly once. Domain runs are never appended; they
    /// only clear the pending flag.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Storage` when the append fails; the
    /// pending flag stays set so the commit can be retried.
    pub async fn commit_result(
        &self,
        session: &mut AssessmentSession,
    ) -> Result<SaveOutcome, AssessmentError> {
        if self.is_saving.swap(true, Ordering::SeqCst) {
            return Ok(SaveOutcome::AlreadyInFlight);
        }
        let _guard = InFlightGuard(&self.is_saving);

        if !session.pending_commit() {
            return Ok(SaveOutcome::AlreadySaved);
        }
        if !session.mode().is_full() {
            session.mark_committed();
            return Ok(SaveOutcome::SkippedPartial);
        }

        let completed_at = self.clock.now();
        let results = session.summaries();
        let counts = level_totals(self.catalog.skills(), session.answers());
        #[allow(clippy::cast_possible_truncation)]
        let total_skills = self.catalog.len() as u32;
        let run = AssessmentRun::new(
            completed_at,
            results,
            session.answers().clone(),
            total_skills,
            counts,
        );
        let run_id = run.id().clone();

        self.history.append(&run).await?;
        session.mark_committed();

        // The run is in history now; the partial snapshot is stale.
        if let Err(error) = self.progress.clear().await {
            warn!(%error, "failed to clear saved progress after commit");
        }

        Ok(SaveOutcome::Saved(run_id))
    }

    //
    // ─── HISTORY ───────────────────────────────────────────────────────────
    //

    /// All committed runs in storage order.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Storage` on gateway failures.
    pub async fn history(&self) -> Result<Vec<AssessmentRun>, AssessmentError> {
        Ok(self.history.get_all().await?)
    }

    /// Compare the two most recent runs by completion time. Fewer than two
    /// runs yield an empty comparison set.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Storage` on gateway failures.
    pub async fn compare_latest_two(&self) -> Result<Vec<ProgressComparison>, AssessmentError> {
        let mut runs = self.history.get_all().await?;
        if runs.len() < 2 {
            return Ok(Vec::new());
        }
        runs.sort_by_key(AssessmentRun::completed_at);
        let (Some(latest), Some(previous)) = (runs.pop(), runs.pop()) else {
            return Ok(Vec::new());
        };
        Ok(compare_runs(&latest, &previous))
    }

    /// Remove one run from history.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Storage` on gateway failures.
    pub async fn delete_history(&self, id: &str) -> Result<(), AssessmentError> {
        self.history.delete(id).await?;
        Ok(())
    }

    /// Remove all runs from history.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Storage` on gateway failures.
    pub async fn clear_all_history(&self) -> Result<(), AssessmentError> {
        self.history.clear_all().await?;
        Ok(())
    }

    async fn clear_superseded_snapshot(&self) {
        if let Err(error) = self.progress.clear().await {
            warn!(%error, "failed to clear superseded progress snapshot");
        }
    }
}
