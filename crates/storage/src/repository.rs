use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use assess_core::model::AssessmentRun;
use assess_core::session::ProgressSnapshot;

use crate::kv::{KeyValueStore, StorageError, keys};
use crate::records::{AssessmentRecord, ProfileRecord, ProgressRecord};

/// Repository contract for the single in-progress snapshot.
///
/// At most one snapshot exists; `save` overwrites it and is idempotent.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Persist the snapshot, replacing any prior one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save(&self, snapshot: &ProgressSnapshot) -> Result<(), StorageError>;

    /// Fetch the stored snapshot, or `None` when nothing was saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decode failures.
    async fn load(&self) -> Result<Option<ProgressSnapshot>, StorageError>;

    /// Delete the stored snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    async fn clear(&self) -> Result<(), StorageError>;

    /// True when a snapshot is currently stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn has_saved(&self) -> Result<bool, StorageError>;
}

/// Repository contract for the append-only assessment history.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Append a completed run to the history, creating the profile on
    /// first use.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be stored.
    async fn append(&self, run: &AssessmentRun) -> Result<(), StorageError>;

    /// All runs in storage (append) order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decode failures.
    async fn get_all(&self) -> Result<Vec<AssessmentRun>, StorageError>;

    /// The run with the most recent completion time, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decode failures.
    async fn latest(&self) -> Result<Option<AssessmentRun>, StorageError>;

    /// Remove one run by id. Unknown ids are a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be updated.
    async fn delete(&self, id: &str) -> Result<(), StorageError>;

    /// Remove all runs, keeping the profile itself.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be updated.
    async fn clear_all(&self) -> Result<(), StorageError>;
}

/// First-launch marker, outside the assessment core proper.
#[async_trait]
pub trait LaunchMarkerRepository: Send + Sync {
    /// True until `mark_complete` has run once.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn is_first_launch(&self) -> Result<bool, StorageError>;

    /// Record that the first launch finished.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the marker cannot be stored.
    async fn mark_complete(&self) -> Result<(), StorageError>;

    /// Forget the marker (debug/reset flows).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn reset(&self) -> Result<(), StorageError>;
}

/// Gateway implementing all repositories as JSON documents over any
/// key-value backend.
#[derive(Clone)]
pub struct JsonStore {
    kv: Arc<dyn KeyValueStore>,
}

impl JsonStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.kv.get(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw =
            serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.kv.set(key, &raw).await
    }

    async fn load_profile(&self) -> Result<Option<ProfileRecord>, StorageError> {
        self.get_json(keys::USER_PROFILE).await
    }

    async fn save_profile(&self, profile: &ProfileRecord) -> Result<(), StorageError> {
        self.set_json(keys::USER_PROFILE, profile).await
    }
}

#[async_trait]
impl ProgressRepository for JsonStore {
    async fn save(&self, snapshot: &ProgressSnapshot) -> Result<(), StorageError> {
        self.set_json(keys::SAVED_PROGRESS, &ProgressRecord::from_snapshot(snapshot))
            .await
    }

    async fn load(&self) -> Result<Option<ProgressSnapshot>, StorageError> {
        let record: Option<ProgressRecord> = self.get_json(keys::SAVED_PROGRESS).await?;
        Ok(record.map(ProgressRecord::into_snapshot))
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.kv.remove(keys::SAVED_PROGRESS).await
    }

    async fn has_saved(&self) -> Result<bool, StorageError> {
        Ok(self.kv.get(keys::SAVED_PROGRESS).await?.is_some())
    }
}

#[async_trait]
impl HistoryRepository for JsonStore {
    async fn append(&self, run: &AssessmentRun) -> Result<(), StorageError> {
        let record = AssessmentRecord::from_run(run);
        let mut profile = match self.load_profile().await? {
            Some(profile) => profile,
            None => ProfileRecord {
                id: run.completed_at().timestamp_millis().to_string(),
                history: Vec::new(),
            },
        };
        profile.history.push(record);
        self.save_profile(&profile).await
    }

    async fn get_all(&self) -> Result<Vec<AssessmentRun>, StorageError> {
        let Some(profile) = self.load_profile().await? else {
            return Ok(Vec::new());
        };
        profile
            .history
            .into_iter()
            .map(AssessmentRecord::into_run)
            .collect()
    }

    async fn latest(&self) -> Result<Option<AssessmentRun>, StorageError> {
        let runs = self.get_all().await?;
        Ok(runs.into_iter().max_by_key(AssessmentRun::completed_at))
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        let Some(mut profile) = self.load_profile().await? else {
            return Ok(());
        };
        profile.history.retain(|record| record.id != id);
        self.save_profile(&profile).await
    }

    async fn clear_all(&self) -> Result<(), StorageError> {
        let Some(mut profile) = self.load_profile().await? else {
            return Ok(());
        };
        profile.history.clear();
        self.save_profile(&profile).await
    }
}

#[async_trait]
impl LaunchMarkerRepository for JsonStore {
    async fn is_first_launch(&self) -> Result<bool, StorageError> {
        Ok(self.kv.get(keys::FIRST_LAUNCH).await?.is_none())
    }

    async fn mark_complete(&self) -> Result<(), StorageError> {
        self.kv.set(keys::FIRST_LAUNCH, "completed").await
    }

    async fn reset(&self) -> Result<(), StorageError> {
        self.kv.remove(keys::FIRST_LAUNCH).await
    }
}

/// Aggregates the gateway repositories behind trait objects for easy
/// backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub history: Arc<dyn HistoryRepository>,
    pub launch: Arc<dyn LaunchMarkerRepository>,
}

impl Storage {
    /// Build a `Storage` over any key-value backend.
    #[must_use]
    pub fn from_kv(kv: Arc<dyn KeyValueStore>) -> Self {
        let store = Arc::new(JsonStore::new(kv));
        Self {
            progress: Arc::clone(&store) as Arc<dyn ProgressRepository>,
            history: Arc::clone(&store) as Arc<dyn HistoryRepository>,
            launch: store as Arc<dyn LaunchMarkerRepository>,
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_kv(Arc::new(crate::kv::InMemoryStore::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::model::{AnswerLedger, LevelCounts, SkillId};
    use assess_core::time::fixed_now;
    use chrono::Duration;

    fn run_at(offset_minutes: i64) -> AssessmentRun {
        let mut answers = AnswerLedger::new();
        answers.record(SkillId::new(1), true);
        AssessmentRun::new(
            fixed_now() + Duration::minutes(offset_minutes),
            Vec::new(),
            answers,
            4,
            LevelCounts::default(),
        )
    }

    #[tokio::test]
    async fn progress_round_trips_exactly() {
        let storage = Storage::in_memory();
        let mut answers = AnswerLedger::new();
        answers.record(SkillId::new(2), true);
        let snapshot = ProgressSnapshot {
            current_index: 3,
            answers,
            progress_percent: 75,
            saved_at: fixed_now(),
        };

        assert!(!storage.progress.has_saved().await.unwrap());
        storage.progress.save(&snapshot).await.unwrap();
        storage.progress.save(&snapshot).await.unwrap();

        let loaded = storage.progress.load().await.unwrap().unwrap();
        assert_eq!(loaded, snapshot);

        storage.progress.clear().await.unwrap();
        assert_eq!(storage.progress.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn history_appends_in_order() {
        let storage = Storage::in_memory();
        let first = run_at(0);
        let second = run_at(10);

        storage.history.append(&first).await.unwrap();
        storage.history.append(&second).await.unwrap();

        let all = storage.history.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], first);
        assert_eq!(all[1], second);

        let latest = storage.history.latest().await.unwrap().unwrap();
        assert_eq!(latest, second);
    }

    #[tokio::test]
    async fn history_delete_and_clear() {
        let storage = Storage::in_memory();
        let first = run_at(0);
        let second = run_at(10);
        storage.history.append(&first).await.unwrap();
        storage.history.append(&second).await.unwrap();

        storage.history.delete(first.id().as_str()).await.unwrap();
        let remaining = storage.history.get_all().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id(), second.id());

        storage.history.delete("assessment_unknown").await.unwrap();
        assert_eq!(storage.history.get_all().await.unwrap().len(), 1);

        storage.history.clear_all().await.unwrap();
        assert!(storage.history.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn launch_marker_flips_once() {
        let storage = Storage::in_memory();
        assert!(storage.launch.is_first_launch().await.unwrap());

        storage.launch.mark_complete().await.unwrap();
        assert!(!storage.launch.is_first_launch().await.unwrap());

        storage.launch.reset().await.unwrap();
        assert!(storage.launch.is_first_launch().await.unwrap());
    }
}
