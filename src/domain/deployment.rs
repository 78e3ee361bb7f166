// Deployment domain model
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The most recent deployment recorded for one (repository, environment) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// Commit SHA or tag that was deployed.
    #[serde(rename = "ref")]
    pub reference: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl Deployment {
    pub fn new(reference: String, url: String, created_at: DateTime<Utc>) -> Self {
        Self {
            reference,
            url,
            created_at,
        }
    }

    /// Creation time as shown in a dashboard cell, e.g. `2024-01-01 (00:00:00)`.
    pub fn created_label(&self) -> String {
        self.created_at.format("%Y-%m-%d (%H:%M:%S)").to_string()
    }
}
