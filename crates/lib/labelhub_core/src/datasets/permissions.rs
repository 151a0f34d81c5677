//! Per-user dataset permissions.

use sqlx::SqlitePool;
use tracing::info;

use super::{DatasetError, get_dataset};
use crate::models::auth::User;

/// Whether `user` may work on `dataset_id`.
///
/// Admins always may, without a lookup. A missing grant is `Ok(false)`;
/// only storage failures are errors.
pub async fn user_has_dataset_access(
    pool: &SqlitePool,
    user: &User,
    dataset_id: i64,
) -> Result<bool, DatasetError> {
    if user.is_admin() {
        return Ok(true);
    }

    let granted = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM user_datasets WHERE user_id = ? AND dataset_id = ?)",
    )
    .bind(user.id)
    .bind(dataset_id)
    .fetch_one(pool)
    .await?;
    Ok(granted)
}

/// Grant `user_id` access to `dataset_id`.
///
/// Granting twice is a no-op. Returns whether a new grant was recorded.
pub async fn grant_access(
    pool: &SqlitePool,
    user_id: i64,
    dataset_id: i64,
) -> Result<bool, DatasetError> {
    let user_exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
    if !user_exists {
        return Err(DatasetError::NotFound(format!("user {user_id}")));
    }
    get_dataset(pool, dataset_id).await?;

    let inserted =
        sqlx::query("INSERT OR IGNORE INTO user_datasets (user_id, dataset_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(dataset_id)
            .execute(pool)
            .await?
            .rows_affected()
            > 0;

    if inserted {
        info!(user_id, dataset_id, "dataset access granted");
    }
    Ok(inserted)
}

/// Withdraw a grant. Returns whether one existed.
pub async fn revoke_access(
    pool: &SqlitePool,
    user_id: i64,
    dataset_id: i64,
) -> Result<bool, DatasetError> {
    let removed = sqlx::query("DELETE FROM user_datasets WHERE user_id = ? AND dataset_id = ?")
        .bind(user_id)
        .bind(dataset_id)
        .execute(pool)
        .await?
        .rows_affected()
        > 0;

    if removed {
        info!(user_id, dataset_id, "dataset access revoked");
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;
    use crate::testing::{self, TestDb};

    #[tokio::test]
    async fn admins_have_access_without_grants() {
        let db = TestDb::new().await;
        let admin = testing::user(&db.pool, "root@example.com", Role::Admin).await;
        let dataset = testing::dataset(&db.pool, "d").await;

        assert!(user_has_dataset_access(&db.pool, &admin, dataset.id).await.unwrap());
        // Not even the dataset's existence is checked.
        assert!(user_has_dataset_access(&db.pool, &admin, 9999).await.unwrap());
    }

    #[tokio::test]
    async fn annotator_access_follows_grants() {
        let db = TestDb::new().await;
        let ann = testing::user(&db.pool, "ann@example.com", Role::Annotator).await;
        let dataset = testing::dataset(&db.pool, "d").await;
        let other = testing::dataset(&db.pool, "other").await;

        assert!(!user_has_dataset_access(&db.pool, &ann, dataset.id).await.unwrap());

        assert!(grant_access(&db.pool, ann.id, dataset.id).await.unwrap());
        assert!(user_has_dataset_access(&db.pool, &ann, dataset.id).await.unwrap());
        assert!(!user_has_dataset_access(&db.pool, &ann, other.id).await.unwrap());

        assert!(revoke_access(&db.pool, ann.id, dataset.id).await.unwrap());
        assert!(!user_has_dataset_access(&db.pool, &ann, dataset.id).await.unwrap());
        assert!(!revoke_access(&db.pool, ann.id, dataset.id).await.unwrap());
    }

    #[tokio::test]
    async fn granting_twice_is_a_no_op() {
        let db = TestDb::new().await;
        let ann = testing::user(&db.pool, "ann@example.com", Role::Annotator).await;
        let dataset = testing::dataset(&db.pool, "d").await;

        assert!(grant_access(&db.pool, ann.id, dataset.id).await.unwrap());
        assert!(!grant_access(&db.pool, ann.id, dataset.id).await.unwrap());

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_datasets")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn granting_on_missing_records_is_not_found() {
        let db = TestDb::new().await;
        let ann = testing::user(&db.pool, "ann@example.com", Role::Annotator).await;
        let dataset = testing::dataset(&db.pool, "d").await;

        assert!(matches!(
            grant_access(&db.pool, ann.id + 100, dataset.id).await,
            Err(DatasetError::NotFound(_))
        ));
        assert!(matches!(
            grant_access(&db.pool, ann.id, dataset.id + 100).await,
            Err(DatasetError::NotFound(_))
        ));
    }
}
