//! Sample request handlers. All run inside a `DatasetScope`.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use labelhub_core::models::sample::{Sample, SamplePatch};
use labelhub_core::samples::parse_status;
use serde::Deserialize;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::DatasetScope;
use crate::models::SamplePatchRequest;

#[derive(Deserialize)]
pub struct SamplePath {
    pub sample_id: i64,
}

#[derive(Deserialize)]
pub struct StatusPath {
    pub status: String,
}

/// `GET /datasets/{dataset_id}/samples`
pub async fn list_samples_handler(
    State(state): State<AppState>,
    Extension(scope): Extension<DatasetScope>,
) -> AppResult<Json<Vec<Sample>>> {
    Ok(Json(state.samples.get_samples(scope.dataset_id).await?))
}

/// `GET /datasets/{dataset_id}/samples/next` — the caller's current sample,
/// or a newly assigned one.
pub async fn next_sample_handler(
    State(state): State<AppState>,
    Extension(scope): Extension<DatasetScope>,
) -> AppResult<Json<Sample>> {
    let sample = state
        .samples
        .assign_next(scope.dataset_id, scope.user.id)
        .await?;
    Ok(Json(sample))
}

/// `GET /datasets/{dataset_id}/samples/status/{status}`
pub async fn samples_with_status_handler(
    State(state): State<AppState>,
    Extension(scope): Extension<DatasetScope>,
    Path(path): Path<StatusPath>,
) -> AppResult<Json<Vec<Sample>>> {
    let status = parse_status(&path.status)?;
    let samples = state
        .samples
        .get_samples_with_status(scope.dataset_id, status)
        .await?;
    Ok(Json(samples))
}

/// `GET /datasets/{dataset_id}/samples/{sample_id}`
pub async fn get_sample_handler(
    State(state): State<AppState>,
    Extension(scope): Extension<DatasetScope>,
    Path(path): Path<SamplePath>,
) -> AppResult<Json<Sample>> {
    let sample = state
        .samples
        .get_sample(scope.dataset_id, path.sample_id)
        .await?;
    Ok(Json(sample))
}

/// `PATCH /datasets/{dataset_id}/samples/{sample_id}` — partial update.
pub async fn patch_sample_handler(
    State(state): State<AppState>,
    Extension(scope): Extension<DatasetScope>,
    Path(path): Path<SamplePath>,
    Json(body): Json<SamplePatchRequest>,
) -> AppResult<Json<Sample>> {
    let patch = SamplePatch::try_from(body)?;
    let sample = state
        .samples
        .patch_sample(scope.dataset_id, path.sample_id, patch)
        .await?;
    Ok(Json(sample))
}
