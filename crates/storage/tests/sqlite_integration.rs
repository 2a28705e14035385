use std::sync::Arc;

use assess_core::model::{
    AnswerLedger, AssessmentRun, LevelCounts, LevelTally, SkillId, SkillSummary,
};
use assess_core::session::ProgressSnapshot;
use assess_core::time::fixed_now;
use chrono::Duration;
use storage::repository::Storage;
use storage::sqlite::SqliteStore;
use storage::{InMemoryStore, KeyValueStore};

fn sample_run(offset_minutes: i64, acquired: u32) -> AssessmentRun {
    let mut answers = AnswerLedger::new();
    for id in 1..=acquired {
        answers.record(SkillId::new(u64::from(id)), true);
    }
    let results = vec![SkillSummary {
        category: "Infrastructure Engineer".to_owned(),
        item: "Server".to_owned(),
        beginner: LevelTally::new(acquired, 3),
        intermediate: LevelTally::default(),
        advanced: LevelTally::default(),
    }];
    AssessmentRun::new(
        fixed_now() + Duration::minutes(offset_minutes),
        results,
        answers,
        3,
        LevelCounts::default(),
    )
}

#[tokio::test]
async fn sqlite_kv_round_trips_values() {
    let store = SqliteStore::connect("sqlite:file:memdb_kv?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");

    assert_eq!(store.get("missing").await.unwrap(), None);
    store.set("k", "v1").await.unwrap();
    store.set("k", "v2").await.unwrap();
    assert_eq!(store.get("k").await.unwrap(), Some("v2".to_owned()));

    store.remove("k").await.unwrap();
    assert_eq!(store.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_progress_round_trips_exactly() {
    let store = SqliteStore::connect("sqlite:file:memdb_progress?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");
    let storage = Storage::from_kv(Arc::new(store));

    let mut answers = AnswerLedger::new();
    answers.record(SkillId::new(1), true);
    answers.record(SkillId::new(2), false);
    let snapshot = ProgressSnapshot {
        current_index: 2,
        answers,
        progress_percent: 50,
        saved_at: fixed_now(),
    };

    storage.progress.save(&snapshot).await.unwrap();
    let loaded = storage.progress.load().await.unwrap().expect("snapshot");
    assert_eq!(loaded.current_index, snapshot.current_index);
    assert_eq!(loaded.answers, snapshot.answers);
    assert_eq!(loaded.progress_percent, snapshot.progress_percent);

    storage.progress.clear().await.unwrap();
    assert!(!storage.progress.has_saved().await.unwrap());
}

#[tokio::test]
async fn sqlite_history_appends_and_deletes() {
    let store = SqliteStore::connect("sqlite:file:memdb_history?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");
    let storage = Storage::from_kv(Arc::new(store));

    let first = sample_run(0, 1);
    let second = sample_run(10, 2);
    storage.history.append(&first).await.unwrap();
    storage.history.append(&second).await.unwrap();

    let all = storage.history.get_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id(), first.id());

    let latest = storage.history.latest().await.unwrap().expect("latest");
    assert_eq!(latest.id(), second.id());

    storage.history.delete(first.id().as_str()).await.unwrap();
    assert_eq!(storage.history.get_all().await.unwrap().len(), 1);

    storage.history.clear_all().await.unwrap();
    assert!(storage.history.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn in_memory_and_sqlite_store_identical_documents() {
    let sqlite = SqliteStore::connect("sqlite:file:memdb_parity?mode=memory&cache=shared")
        .await
        .expect("connect");
    sqlite.migrate().await.expect("migrate");
    let memory = InMemoryStore::new();

    let run = sample_run(0, 2);
    let sqlite_storage = Storage::from_kv(Arc::new(sqlite));
    let memory_storage = Storage::from_kv(Arc::new(memory));

    sqlite_storage.history.append(&run).await.unwrap();
    memory_storage.history.append(&run).await.unwrap();

    let from_sqlite = sqlite_storage.history.get_all().await.unwrap();
    let from_memory = memory_storage.history.get_all().await.unwrap();
    assert_eq!(from_sqlite, from_memory);
}
