use thiserror::Error;

use caregap_ingest::IngestError;
use caregap_model::StoreError;

/// Errors from the merge and sort engines, classified per failure mode:
/// bad input data, a missing taxonomy, an unreachable store, a capacity
/// rejection, or an output assembly failure.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    Input(String),
    #[error("gaps taxonomy not found in the configuration store; upload one before merging")]
    TaxonomyMissing,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error("too many PDF files: {count} submitted, limit is {limit}")]
    TooManyFiles { count: usize, limit: usize },
    #[error("could not read PDF '{name}': {detail}")]
    PdfUnreadable { name: String, detail: String },
    #[error("failed to assemble output: {0}")]
    Output(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
