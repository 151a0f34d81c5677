//! Admin request handlers: users, roles, dataset grants, and assignments.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use labelhub_core::auth::queries;
use labelhub_core::datasets::permissions;
use labelhub_core::models::auth::{User, UserWithDatasets};
use labelhub_core::models::sample::Sample;
use tracing::info;

use crate::AppState;
use crate::error::AppResult;
use crate::models::{DatasetGrant, RoleUpdate};

/// `GET /admin/users` — every user with the datasets granted to them.
pub async fn list_users_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<UserWithDatasets>>> {
    Ok(Json(queries::list_users_with_datasets(&state.pool).await?))
}

/// `PATCH /admin/users/{user_id}/role`
pub async fn set_role_handler(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(body): Json<RoleUpdate>,
) -> AppResult<Json<User>> {
    let user = queries::set_user_role(&state.pool, user_id, body.role).await?;
    info!(user_id, role = %user.role, "role changed");
    Ok(Json(user))
}

/// `POST /admin/users/{user_id}/dataset-perms` — grant access (idempotent).
pub async fn grant_dataset_handler(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(body): Json<DatasetGrant>,
) -> AppResult<StatusCode> {
    permissions::grant_access(&state.pool, user_id, body.dataset_id).await?;
    Ok(StatusCode::CREATED)
}

/// `DELETE /admin/users/{user_id}/dataset-perms` — withdraw access.
pub async fn revoke_dataset_handler(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(body): Json<DatasetGrant>,
) -> AppResult<StatusCode> {
    permissions::revoke_access(&state.pool, user_id, body.dataset_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /admin/datasets/{dataset_id}/samples/{sample_id}/release`
pub async fn release_sample_handler(
    State(state): State<AppState>,
    Path((dataset_id, sample_id)): Path<(i64, i64)>,
) -> AppResult<Json<Sample>> {
    let sample = state
        .samples
        .release_assignment(dataset_id, sample_id)
        .await?;
    Ok(Json(sample))
}
