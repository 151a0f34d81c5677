//! Shared fixtures for unit tests.

use sqlx::SqlitePool;
use tempfile::TempDir;

use crate::auth::queries;
use crate::datasets;
use crate::models::auth::{Role, User};
use crate::models::dataset::{Dataset, DatasetType};
use crate::models::sample::{NewSample, Sample};

/// A migrated database in a private temporary directory.
///
/// File-backed so that every pooled connection sees the same data.
pub(crate) struct TestDb {
    pub pool: SqlitePool,
    _dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let url = format!("sqlite://{}", dir.path().join("test.db").display());
        let pool = crate::db::connect(&url, 8).await.expect("connect");
        crate::migrate::migrate(&pool).await.expect("migrate");
        Self { pool, _dir: dir }
    }
}

/// Insert a user with a placeholder password hash.
pub(crate) async fn user(pool: &SqlitePool, email: &str, role: Role) -> User {
    queries::create_user(pool, email, "not-a-real-hash", role)
        .await
        .expect("create user")
}

pub(crate) async fn dataset(pool: &SqlitePool, name: &str) -> Dataset {
    datasets::create_dataset(pool, name, DatasetType::Entity, None)
        .await
        .expect("create dataset")
}

pub(crate) async fn sample(pool: &SqlitePool, dataset_id: i64, sample: NewSample) -> Sample {
    datasets::add_sample(pool, dataset_id, sample)
        .await
        .expect("add sample")
}

/// Add `count` unlabeled samples, returned in id order.
pub(crate) async fn unlabeled_samples(pool: &SqlitePool, dataset_id: i64, count: usize) -> Vec<Sample> {
    let mut samples = Vec::with_capacity(count);
    for i in 0..count {
        samples.push(sample(pool, dataset_id, NewSample::unlabeled(format!("sample {i}"))).await);
    }
    samples
}
