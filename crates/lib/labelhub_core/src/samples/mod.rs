//! Samples and their allocation to annotators.

pub mod allocator;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db::decode_json;
use crate::models::sample::{ParseStatusError, Sample, SampleStatus};

pub use allocator::SampleAllocator;

/// Sample errors.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("Record not found")]
    RecordNotFound,

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("No samples available")]
    NoSamplesAvailable,

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),
}

impl From<ParseStatusError> for SampleError {
    fn from(e: ParseStatusError) -> Self {
        SampleError::InvalidStatus(e.0)
    }
}

/// Parse a client-supplied status, rejecting unknown values.
pub fn parse_status(raw: &str) -> Result<SampleStatus, SampleError> {
    Ok(raw.parse::<SampleStatus>()?)
}

/// Raw `samples` row in column order:
/// (id, dataset_id, data, status, assigned_to, annotations, metadata, created_at, updated_at).
pub(crate) type SampleRow = (
    i64,
    i64,
    String,
    Option<String>,
    Option<i64>,
    Option<String>,
    Option<String>,
    DateTime<Utc>,
    DateTime<Utc>,
);

/// Build a `Sample` from a raw row. Unknown statuses and malformed JSON are
/// decode failures.
pub(crate) fn parse_sample_row(row: SampleRow) -> Result<Sample, sqlx::Error> {
    let (id, dataset_id, data, status, assigned_to, annotations, metadata, created_at, updated_at) =
        row;
    let status = status
        .map(|s| s.parse::<SampleStatus>())
        .transpose()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    Ok(Sample {
        id,
        dataset_id,
        data,
        status,
        assigned_to,
        annotations: decode_json(annotations)?,
        metadata: decode_json(metadata)?,
        created_at,
        updated_at,
    })
}
