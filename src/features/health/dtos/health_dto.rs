use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Up,
    Down,
}

impl ComponentStatus {
    pub fn from_check(ok: bool) -> Self {
        if ok {
            ComponentStatus::Up
        } else {
            ComponentStatus::Down
        }
    }
}

/// Health of the service and its dependencies
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponseDto {
    /// `ok` when every component is up, otherwise `degraded`
    pub status: String,
    pub database: ComponentStatus,
    /// Upload directory is present and is a directory
    pub upload_dir: ComponentStatus,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponseDto {
    pub fn is_healthy(&self) -> bool {
        self.database == ComponentStatus::Up && self.upload_dir == ComponentStatus::Up
    }
}
