//! # labelhub_api
//!
//! HTTP API library for Labelhub.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, patch, post};
use labelhub_core::auth::TokenAuthenticator;
use labelhub_core::samples::SampleAllocator;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{admin, auth, datasets, samples, user};
use crate::middleware::auth::{require_admin, require_auth, require_dataset_access};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool.
    pub pool: SqlitePool,
    /// API configuration.
    pub config: ApiConfig,
    /// Session token issuance and validation.
    pub tokens: TokenAuthenticator,
    /// Sample allocation.
    pub samples: SampleAllocator,
}

impl AppState {
    /// Wire the core components to one pool.
    pub fn new(pool: SqlitePool, config: ApiConfig) -> Self {
        Self {
            tokens: TokenAuthenticator::with_lifetimes(pool.clone(), config.token_lifetimes),
            samples: SampleAllocator::new(pool.clone()),
            pool,
            config,
        }
    }
}

/// Run embedded database migrations.
///
/// Delegates to `labelhub_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    labelhub_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public = Router::new()
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/refresh-token", post(auth::refresh_handler))
        .route("/auth/logout", post(auth::logout_handler));

    // Routes scoped to one dataset (require a grant, or admin)
    let dataset_scoped = Router::new()
        .route("/datasets/{dataset_id}", get(datasets::get_dataset_handler))
        .route(
            "/datasets/{dataset_id}/samples",
            get(samples::list_samples_handler),
        )
        .route(
            "/datasets/{dataset_id}/samples/next",
            get(samples::next_sample_handler),
        )
        .route(
            "/datasets/{dataset_id}/samples/status/{status}",
            get(samples::samples_with_status_handler),
        )
        .route(
            "/datasets/{dataset_id}/samples/{sample_id}",
            get(samples::get_sample_handler).patch(samples::patch_sample_handler),
        )
        .route_layer(from_fn_with_state(state.clone(), require_dataset_access));

    // Admin routes
    let admin = Router::new()
        .route("/admin/users", get(admin::list_users_handler))
        .route("/admin/users/{user_id}/role", patch(admin::set_role_handler))
        .route(
            "/admin/users/{user_id}/dataset-perms",
            post(admin::grant_dataset_handler).delete(admin::revoke_dataset_handler),
        )
        .route(
            "/admin/datasets/{dataset_id}/samples/{sample_id}/release",
            post(admin::release_sample_handler),
        )
        .route_layer(axum::middleware::from_fn(require_admin));

    // Protected routes (require auth); the auth layer wraps the inner ones
    let protected = Router::new()
        .route("/user", get(user::current_user_handler))
        .route("/datasets", get(datasets::list_datasets_handler))
        .merge(dataset_scoped)
        .merge(admin)
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
