use std::sync::Arc;

use assess_core::Clock;
use assess_core::catalog::Catalog;
use storage::repository::{LaunchMarkerRepository, Storage};

use crate::assessment_service::AssessmentService;
use crate::catalog_source::CatalogSource;
use crate::error::AppServicesError;

/// Assembles app-facing services around one loaded catalog.
#[derive(Clone)]
pub struct AppServices {
    assessment: Arc<AssessmentService>,
    launch: Arc<dyn LaunchMarkerRepository>,
}

impl std::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppServices").finish_non_exhaustive()
    }
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or catalog
    /// loading fails. An empty or malformed catalog means no assessment
    /// may start.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        source: &dyn CatalogSource,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::assemble(storage, clock, source).await
    }

    /// Build services over in-memory storage, for tests and prototyping.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if catalog loading fails.
    pub async fn new_in_memory(
        clock: Clock,
        source: &dyn CatalogSource,
    ) -> Result<Self, AppServicesError> {
        Self::assemble(Storage::in_memory(), clock, source).await
    }

    async fn assemble(
        storage: Storage,
        clock: Clock,
        source: &dyn CatalogSource,
    ) -> Result<Self, AppServicesError> {
        let entries = source.load().await?;
        let catalog = Catalog::from_entries(entries)?;

        let assessment = Arc::new(AssessmentService::new(
            catalog,
            clock,
            Arc::clone(&storage.progress),
            Arc::clone(&storage.history),
        ));

        Ok(Self {
            assessment,
            launch: storage.launch,
        })
    }

    #[must_use]
    pub fn assessment(&self) -> Arc<AssessmentService> {
        Arc::clone(&self.assessment)
    }

    /// True until the first launch is marked complete.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Storage` on gateway failures.
    pub async fn is_first_launch(&self) -> Result<bool, AppServicesError> {
        Ok(self.launch.is_first_launch().await?)
    }

    /// Record that the first launch finished.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Storage` on gateway failures.
    pub async fn mark_launch_complete(&self) -> Result<(), AppServicesError> {
        Ok(self.launch.mark_complete().await?)
    }
}
