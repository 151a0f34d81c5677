//! Sample domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Final label of a sample. An absent status means "not yet labeled".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleStatus {
    Accepted,
    Rejected,
    Uncertain,
}

impl SampleStatus {
    pub const ALL: [SampleStatus; 3] = [
        SampleStatus::Accepted,
        SampleStatus::Rejected,
        SampleStatus::Uncertain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SampleStatus::Accepted => "accepted",
            SampleStatus::Rejected => "rejected",
            SampleStatus::Uncertain => "uncertain",
        }
    }
}

impl fmt::Display for SampleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known status.
#[derive(Debug, Error)]
#[error("invalid status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for SampleStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SampleStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// One unit of annotation work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub id: i64,
    pub dataset_id: i64,
    pub data: String,
    pub status: Option<SampleStatus>,
    /// User currently working the sample.
    pub assigned_to: Option<i64>,
    pub annotations: Option<serde_json::Value>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sample {
    /// Unlabeled and held by `user_id`.
    pub fn is_claimed_by(&self, user_id: i64) -> bool {
        self.status.is_none() && self.assigned_to == Some(user_id)
    }
}

/// Partial update of a sample. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SamplePatch {
    pub status: Option<SampleStatus>,
    pub annotations: Option<serde_json::Value>,
    pub metadata: Option<serde_json::Value>,
}

impl SamplePatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.annotations.is_none() && self.metadata.is_none()
    }
}

/// Sample to be inserted into a dataset.
#[derive(Debug, Clone, Default)]
pub struct NewSample {
    pub data: String,
    pub status: Option<SampleStatus>,
    pub assigned_to: Option<i64>,
    pub annotations: Option<serde_json::Value>,
    pub metadata: Option<serde_json::Value>,
}

impl NewSample {
    pub fn unlabeled(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }
}
