//! X-ray analysis pipeline: normalize the upload, classify it through the
//! external vision service (with literal fallback data), draft a narrative
//! report through the text-generation service, persist the result.

pub mod classifier;
pub mod orchestrator;
pub mod preprocess;
pub mod prompt;
pub mod report;

pub use classifier::*;
pub use orchestrator::*;
pub use preprocess::*;
pub use prompt::*;
pub use report::*;

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Patient not found")]
    PatientNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Report generation failed: {0}")]
    Report(#[from] ReportError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
