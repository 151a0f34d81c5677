//! Request and response bodies.

use chrono::{DateTime, Utc};
use labelhub_core::models::auth::Role;
use labelhub_core::models::sample::SamplePatch;
use labelhub_core::samples::{SampleError, parse_status};
use serde::{Deserialize, Serialize};

/// JSON error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// `POST /auth/login` and `POST /auth/register` body.
#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// `POST /auth/refresh-token` response. The tokens travel in cookies.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

/// `PATCH /datasets/{id}/samples/{sample_id}` body. Absent fields are unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct SamplePatchRequest {
    pub status: Option<String>,
    pub annotations: Option<serde_json::Value>,
    pub metadata: Option<serde_json::Value>,
}

impl TryFrom<SamplePatchRequest> for SamplePatch {
    type Error = SampleError;

    fn try_from(req: SamplePatchRequest) -> Result<Self, Self::Error> {
        Ok(SamplePatch {
            status: req.status.as_deref().map(parse_status).transpose()?,
            annotations: req.annotations,
            metadata: req.metadata,
        })
    }
}

/// `PATCH /admin/users/{id}/role` body.
#[derive(Debug, Deserialize)]
pub struct RoleUpdate {
    pub role: Role,
}

/// `POST|DELETE /admin/users/{id}/dataset-perms` body.
#[derive(Debug, Deserialize)]
pub struct DatasetGrant {
    pub dataset_id: i64,
}
