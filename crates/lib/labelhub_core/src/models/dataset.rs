//! Dataset domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of annotation a dataset collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetType {
    Entity,
    Relation,
}

impl DatasetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetType::Entity => "entity",
            DatasetType::Relation => "relation",
        }
    }
}

impl fmt::Display for DatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("invalid dataset type: {0}")]
pub struct ParseDatasetTypeError(pub String);

impl FromStr for DatasetType {
    type Err = ParseDatasetTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entity" => Ok(DatasetType::Entity),
            "relation" => Ok(DatasetType::Relation),
            other => Err(ParseDatasetTypeError(other.to_string())),
        }
    }
}

/// An annotation project owning zero or more samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub dataset_type: DatasetType,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Progress counters for a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub total_samples: i64,
    /// Samples carrying a final status.
    pub completed_samples: i64,
    /// Samples neither labeled nor currently assigned.
    pub pending_samples: i64,
}

/// Dataset plus its progress counters, as listed to users.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetWithStats {
    #[serde(flatten)]
    pub dataset: Dataset,
    pub stats: DatasetStats,
}
