use crate::chart::ChartKind;
use std::time::Duration;
use thiserror::Error;

/// Rejected request data. Raised before any metrics are synthesized.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInputError {
    #[error("at least {min} products are required (got {got})")]
    TooFewProducts { min: usize, got: usize },

    #[error("at most {max} products are allowed (got {got})")]
    TooManyProducts { max: usize, got: usize },

    #[error("product names must be unique (duplicate: {0})")]
    DuplicateProduct(String),

    #[error("product names must not exceed {max} characters")]
    ProductNameTooLong { max: usize },

    #[error("sector must not be empty")]
    EmptySector,

    #[error("sector must not exceed {max} characters")]
    SectorTooLong { max: usize },

    #[error("invalid language model option: {0}")]
    InvalidModelOption(String),

    #[error("exactly {expected} recommendations are required (got {got})")]
    RecommendationCount { expected: usize, got: usize },

    #[error("invalid metrics for {product}: {detail}")]
    InvalidMetrics { product: String, detail: String },
}

#[derive(Debug, Clone, Error)]
#[error("{kind} chart could not be rendered: {detail}")]
pub struct ChartRenderError {
    pub kind: ChartKind,
    pub detail: String,
}

#[derive(Debug, Error)]
pub enum ReportGenerationError {
    #[error("failed to prepare the report directory")]
    Directory(#[source] std::io::Error),

    #[error("failed to serialize the PDF document: {0}")]
    Serialize(String),

    #[error("failed to write the report file")]
    Write(#[source] std::io::Error),

    #[error("a report named {0} already exists")]
    Collision(String),
}

#[derive(Debug, Clone, Error)]
#[error("language model did not answer within {}s", timeout.as_secs_f32())]
pub struct ExternalModelTimeoutError {
    pub timeout: Duration,
}

/// Why a requested report file cannot be served.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    #[error("file name is not allowed")]
    Forbidden,

    #[error("report not found")]
    NotFound,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),

    #[error(transparent)]
    Report(#[from] ReportGenerationError),

    #[error("report task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
