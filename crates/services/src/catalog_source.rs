use async_trait::async_trait;
use thiserror::Error;

use assess_core::model::SkillEntry;

/// Failure to obtain catalog data from its source.
#[derive(Debug, Error)]
#[error("catalog source failed: {0}")]
pub struct CatalogSourceError(pub String);

/// Supplier of raw catalog entries.
///
/// The source must list skills grouped contiguously by domain; the catalog
/// itself validates this once at load time and refuses to start otherwise.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the catalog entries, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogSourceError` when the data cannot be obtained.
    async fn load(&self) -> Result<Vec<SkillEntry>, CatalogSourceError>;
}

/// Catalog source over a fixed in-memory entry list.
#[derive(Debug, Clone)]
pub struct StaticCatalogSource {
    entries: Vec<SkillEntry>,
}

impl StaticCatalogSource {
    #[must_use]
    pub fn new(entries: Vec<SkillEntry>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    async fn load(&self) -> Result<Vec<SkillEntry>, CatalogSourceError> {
        Ok(self.entries.clone())
    }
}
