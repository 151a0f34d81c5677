//! Datasets: creation, listing with progress counters, and sample import.

pub mod permissions;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::db::decode_json;
use crate::models::auth::User;
use crate::models::dataset::{Dataset, DatasetStats, DatasetType, DatasetWithStats};
use crate::models::sample::{NewSample, Sample};
use crate::samples::{SampleRow, parse_sample_row};

/// Dataset errors.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),
}

/// Raw `datasets` row: (id, name, type, metadata, created_at).
type DatasetRow = (i64, String, String, Option<String>, DateTime<Utc>);

/// Dataset row followed by (total, completed, pending) counters.
type DatasetStatsRow = (
    i64,
    String,
    String,
    Option<String>,
    DateTime<Utc>,
    i64,
    i64,
    i64,
);

fn parse_dataset_row(
    (id, name, dataset_type, metadata, created_at): DatasetRow,
) -> Result<Dataset, sqlx::Error> {
    Ok(Dataset {
        id,
        name,
        dataset_type: dataset_type
            .parse::<DatasetType>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        metadata: decode_json(metadata)?,
        created_at,
    })
}

fn parse_stats_row(row: DatasetStatsRow) -> Result<DatasetWithStats, sqlx::Error> {
    let (id, name, dataset_type, metadata, created_at, total, completed, pending) = row;
    Ok(DatasetWithStats {
        dataset: parse_dataset_row((id, name, dataset_type, metadata, created_at))?,
        stats: DatasetStats {
            total_samples: total,
            completed_samples: completed,
            pending_samples: pending,
        },
    })
}

/// Completed = labeled; pending = neither labeled nor held by anyone.
/// The `s.id` guard keeps datasets without samples at zero.
const STATS_SELECT: &str = "SELECT d.id, d.name, d.type, d.metadata, d.created_at, \
     COUNT(s.id), \
     COUNT(s.status), \
     COALESCE(SUM(CASE WHEN s.id IS NOT NULL AND s.status IS NULL AND s.assigned_to IS NULL \
                  THEN 1 ELSE 0 END), 0) \
     FROM datasets d \
     LEFT JOIN samples s ON s.dataset_id = d.id";

/// Create a dataset.
pub async fn create_dataset(
    pool: &SqlitePool,
    name: &str,
    dataset_type: DatasetType,
    metadata: Option<serde_json::Value>,
) -> Result<Dataset, DatasetError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DatasetError::Validation("Dataset name is required".into()));
    }

    let row = sqlx::query_as::<_, DatasetRow>(
        "INSERT INTO datasets (name, type, metadata, created_at) VALUES (?, ?, ?, ?) \
         RETURNING id, name, type, metadata, created_at",
    )
    .bind(name)
    .bind(dataset_type.as_str())
    .bind(metadata.as_ref().map(|m| m.to_string()))
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    let dataset = parse_dataset_row(row)?;
    info!(dataset_id = dataset.id, name = %dataset.name, "dataset created");
    Ok(dataset)
}

/// Fetch a dataset by ID.
pub async fn get_dataset(pool: &SqlitePool, dataset_id: i64) -> Result<Dataset, DatasetError> {
    let row = sqlx::query_as::<_, DatasetRow>(
        "SELECT id, name, type, metadata, created_at FROM datasets WHERE id = ?",
    )
    .bind(dataset_id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(parse_dataset_row(row)?),
        None => Err(DatasetError::NotFound(format!("dataset {dataset_id}"))),
    }
}

/// Fetch a dataset together with its progress counters.
pub async fn get_dataset_with_stats(
    pool: &SqlitePool,
    dataset_id: i64,
) -> Result<DatasetWithStats, DatasetError> {
    let sql = format!("{STATS_SELECT} WHERE d.id = ? GROUP BY d.id");
    let row = sqlx::query_as::<_, DatasetStatsRow>(&sql)
        .bind(dataset_id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(parse_stats_row(row)?),
        None => Err(DatasetError::NotFound(format!("dataset {dataset_id}"))),
    }
}

/// List every dataset with its counters, ordered by ID.
pub async fn list_datasets(pool: &SqlitePool) -> Result<Vec<DatasetWithStats>, DatasetError> {
    let sql = format!("{STATS_SELECT} GROUP BY d.id ORDER BY d.id");
    let rows = sqlx::query_as::<_, DatasetStatsRow>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows
        .into_iter()
        .map(parse_stats_row)
        .collect::<Result<Vec<_>, _>>()?)
}

/// List the datasets `user` may work on: all of them for admins, the granted
/// ones otherwise.
pub async fn list_datasets_for_user(
    pool: &SqlitePool,
    user: &User,
) -> Result<Vec<DatasetWithStats>, DatasetError> {
    if user.is_admin() {
        return list_datasets(pool).await;
    }

    let sql = format!(
        "{STATS_SELECT} \
         WHERE d.id IN (SELECT dataset_id FROM user_datasets WHERE user_id = ?) \
         GROUP BY d.id ORDER BY d.id"
    );
    let rows = sqlx::query_as::<_, DatasetStatsRow>(&sql)
        .bind(user.id)
        .fetch_all(pool)
        .await?;
    Ok(rows
        .into_iter()
        .map(parse_stats_row)
        .collect::<Result<Vec<_>, _>>()?)
}

/// Progress counters of one dataset.
pub async fn dataset_stats(pool: &SqlitePool, dataset_id: i64) -> Result<DatasetStats, DatasetError> {
    Ok(get_dataset_with_stats(pool, dataset_id).await?.stats)
}

/// Insert a sample into an existing dataset.
pub async fn add_sample(
    pool: &SqlitePool,
    dataset_id: i64,
    sample: NewSample,
) -> Result<Sample, DatasetError> {
    get_dataset(pool, dataset_id).await?;

    let now = Utc::now();
    let row = sqlx::query_as::<_, SampleRow>(
        "INSERT INTO samples \
         (dataset_id, data, status, assigned_to, annotations, metadata, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) \
         RETURNING id, dataset_id, data, status, assigned_to, annotations, metadata, \
         created_at, updated_at",
    )
    .bind(dataset_id)
    .bind(&sample.data)
    .bind(sample.status.map(|s| s.as_str()))
    .bind(sample.assigned_to)
    .bind(sample.annotations.as_ref().map(|v| v.to_string()))
    .bind(sample.metadata.as_ref().map(|v| v.to_string()))
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(parse_sample_row(row)?)
}
