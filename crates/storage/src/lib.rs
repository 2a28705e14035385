#![forbid(unsafe_code)]

pub mod kv;
pub mod records;
pub mod repository;
pub mod sqlite;

pub use kv::{InMemoryStore, KeyValueStore, StorageError};
pub use repository::{
    HistoryRepository, JsonStore, LaunchMarkerRepository, ProgressRepository, Storage,
};
