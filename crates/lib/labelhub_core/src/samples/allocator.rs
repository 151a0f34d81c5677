//! Hands each annotator one unlabeled sample at a time.
//!
//! A sample is *claimed* by a user while its status is null and
//! `assigned_to` names them. Labeling it (setting a status) ends the claim,
//! so the next `assign_next` call moves the annotator on.
//!
//! Claiming is a single conditional `UPDATE`: SQLite runs one writer at a
//! time, so the statement's "still unclaimed, and the caller holds nothing"
//! predicate is checked and applied atomically. Two annotators can never be
//! handed the same sample, and one annotator never holds two.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::{SampleError, SampleRow, parse_sample_row};
use crate::models::sample::{Sample, SamplePatch, SampleStatus};

/// Claim the lowest-ID free sample of a dataset for a user.
///
/// `?1` user, `?2` dataset, `?3` timestamp.
const CLAIM_NEXT: &str = "\
UPDATE samples SET assigned_to = ?1, updated_at = ?3
WHERE id = (
        SELECT id FROM samples
        WHERE dataset_id = ?2 AND status IS NULL AND assigned_to IS NULL
        ORDER BY id LIMIT 1)
    AND assigned_to IS NULL
    AND NOT EXISTS (
        SELECT 1 FROM samples
        WHERE dataset_id = ?2 AND status IS NULL AND assigned_to = ?1)
RETURNING id, dataset_id, data, status, assigned_to, annotations, metadata, created_at, updated_at";

/// Sample allocation and scoped sample access.
#[derive(Debug, Clone)]
pub struct SampleAllocator {
    pool: SqlitePool,
}

impl SampleAllocator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Return the caller's current claim in `dataset_id`, or claim a new one.
    ///
    /// Repeated calls before the claimed sample is labeled return the same
    /// sample. Fails with `NoSamplesAvailable` once every sample is labeled or
    /// held by someone else.
    pub async fn assign_next(&self, dataset_id: i64, user_id: i64) -> Result<Sample, SampleError> {
        if let Some(sample) = self.current_claim(dataset_id, user_id).await? {
            return Ok(sample);
        }

        let claimed = sqlx::query_as::<_, SampleRow>(CLAIM_NEXT)
            .bind(user_id)
            .bind(dataset_id)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = claimed {
            let sample = parse_sample_row(row)?;
            info!(dataset_id, user_id, sample_id = sample.id, "sample assigned");
            return Ok(sample);
        }

        // A concurrent call by the same user may have claimed first.
        match self.current_claim(dataset_id, user_id).await? {
            Some(sample) => Ok(sample),
            None => {
                debug!(dataset_id, user_id, "no samples available");
                Err(SampleError::NoSamplesAvailable)
            }
        }
    }

    /// The unlabeled sample `user_id` currently holds in `dataset_id`.
    pub async fn current_claim(
        &self,
        dataset_id: i64,
        user_id: i64,
    ) -> Result<Option<Sample>, SampleError> {
        let row = sqlx::query_as::<_, SampleRow>(
            "SELECT id, dataset_id, data, status, assigned_to, annotations, metadata, \
             created_at, updated_at \
             FROM samples \
             WHERE dataset_id = ? AND status IS NULL AND assigned_to = ? \
             ORDER BY id LIMIT 1",
        )
        .bind(dataset_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(parse_sample_row).transpose()?)
    }

    /// Fetch one sample; the dataset is part of the lookup.
    pub async fn get_sample(&self, dataset_id: i64, sample_id: i64) -> Result<Sample, SampleError> {
        let row = sqlx::query_as::<_, SampleRow>(
            "SELECT id, dataset_id, data, status, assigned_to, annotations, metadata, \
             created_at, updated_at \
             FROM samples WHERE id = ? AND dataset_id = ?",
        )
        .bind(sample_id)
        .bind(dataset_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(parse_sample_row(row)?),
            None => Err(SampleError::RecordNotFound),
        }
    }

    /// All samples of a dataset, ordered by ID.
    pub async fn get_samples(&self, dataset_id: i64) -> Result<Vec<Sample>, SampleError> {
        let rows = sqlx::query_as::<_, SampleRow>(
            "SELECT id, dataset_id, data, status, assigned_to, annotations, metadata, \
             created_at, updated_at \
             FROM samples WHERE dataset_id = ? ORDER BY id",
        )
        .bind(dataset_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(parse_sample_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    /// Samples of a dataset carrying `status`, ordered by ID.
    pub async fn get_samples_with_status(
        &self,
        dataset_id: i64,
        status: SampleStatus,
    ) -> Result<Vec<Sample>, SampleError> {
        let rows = sqlx::query_as::<_, SampleRow>(
            "SELECT id, dataset_id, data, status, assigned_to, annotations, metadata, \
             created_at, updated_at \
             FROM samples WHERE dataset_id = ? AND status = ? ORDER BY id",
        )
        .bind(dataset_id)
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(parse_sample_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    /// Apply the provided fields of `patch`; omitted fields keep their value.
    ///
    /// Any user with access to the dataset may patch any of its samples.
    pub async fn patch_sample(
        &self,
        dataset_id: i64,
        sample_id: i64,
        patch: SamplePatch,
    ) -> Result<Sample, SampleError> {
        let row = sqlx::query_as::<_, SampleRow>(
            "UPDATE samples SET \
             status = COALESCE(?3, status), \
             annotations = COALESCE(?4, annotations), \
             metadata = COALESCE(?5, metadata), \
             updated_at = ?6 \
             WHERE id = ?1 AND dataset_id = ?2 \
             RETURNING id, dataset_id, data, status, assigned_to, annotations, metadata, \
             created_at, updated_at",
        )
        .bind(sample_id)
        .bind(dataset_id)
        .bind(patch.status.map(|s| s.as_str()))
        .bind(patch.annotations.as_ref().map(|v| v.to_string()))
        .bind(patch.metadata.as_ref().map(|v| v.to_string()))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(SampleError::RecordNotFound);
        };
        let sample = parse_sample_row(row)?;
        debug!(dataset_id, sample_id, status = ?sample.status, "sample patched");
        Ok(sample)
    }

    /// Put an unlabeled sample back into the pool.
    ///
    /// Labeled samples are returned unchanged.
    pub async fn release_assignment(
        &self,
        dataset_id: i64,
        sample_id: i64,
    ) -> Result<Sample, SampleError> {
        let row = sqlx::query_as::<_, SampleRow>(
            "UPDATE samples SET assigned_to = NULL, updated_at = ? \
             WHERE id = ? AND dataset_id = ? AND status IS NULL AND assigned_to IS NOT NULL \
             RETURNING id, dataset_id, data, status, assigned_to, annotations, metadata, \
             created_at, updated_at",
        )
        .bind(Utc::now())
        .bind(sample_id)
        .bind(dataset_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                info!(dataset_id, sample_id, "sample assignment released");
                Ok(parse_sample_row(row)?)
            }
            None => self.get_sample(dataset_id, sample_id).await,
        }
    }
}
