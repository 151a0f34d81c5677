//! Database migration support.
//!
//! Embeds and runs SQL migrations from `labelhub_core/migrations/`.

use sqlx::SqlitePool;

/// Run all embedded database migrations against the given pool.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_create_all_tables() {
        let db = crate::testing::TestDb::new().await;

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE '\\_%' ESCAPE '\\' \
             AND name NOT LIKE 'sqlite%' ORDER BY name",
        )
        .fetch_all(&db.pool)
        .await
        .expect("list tables");

        assert_eq!(
            tables,
            vec![
                "access_tokens",
                "datasets",
                "refresh_tokens",
                "samples",
                "user_datasets",
                "users"
            ]
        );
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let db = crate::testing::TestDb::new().await;
        migrate(&db.pool).await.expect("second run is a no-op");
    }
}
