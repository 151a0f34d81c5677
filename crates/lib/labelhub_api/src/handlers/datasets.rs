//! Dataset request handlers.

use axum::extract::State;
use axum::{Extension, Json};
use labelhub_core::datasets;
use labelhub_core::models::dataset::DatasetWithStats;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::{AuthenticatedUser, DatasetScope};

/// `GET /datasets` — datasets the caller may work on, with progress counters.
pub async fn list_datasets_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<DatasetWithStats>>> {
    let listed = datasets::list_datasets_for_user(&state.pool, &user).await?;
    Ok(Json(listed))
}

/// `GET /datasets/{dataset_id}` — one dataset with its counters.
pub async fn get_dataset_handler(
    State(state): State<AppState>,
    Extension(scope): Extension<DatasetScope>,
) -> AppResult<Json<DatasetWithStats>> {
    let dataset = datasets::get_dataset_with_stats(&state.pool, scope.dataset_id).await?;
    Ok(Json(dataset))
}
