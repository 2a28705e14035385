#![forbid(unsafe_code)]

pub mod app_services;
pub mod assessment_service;
pub mod catalog_source;
pub mod error;

pub use assess_core::Clock;

pub use app_services::AppServices;
pub use assessment_service::{AssessmentService, SaveOutcome};
pub use catalog_source::{CatalogSource, CatalogSourceError, StaticCatalogSource};
pub use error::{AppServicesError, AssessmentError};
