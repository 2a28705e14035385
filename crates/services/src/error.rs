//! Shared error types for the services crate.

use thiserror::Error;

use assess_core::catalog::CatalogError;
use assess_core::session::SessionError;
use storage::kv::StorageError;
use storage::sqlite::SqliteInitError;

use crate::catalog_source::CatalogSourceError;

/// Errors emitted by `AssessmentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssessmentError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    CatalogSource(#[from] CatalogSourceError),
}
