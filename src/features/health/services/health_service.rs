use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use crate::features::claims::repositories::ClaimRepository;
use crate::features::health::dtos::{ComponentStatus, HealthResponseDto};
use crate::modules::storage::AttachmentStorage;

/// Checks the store and the upload directory
pub struct HealthService {
    repository: Arc<dyn ClaimRepository>,
    storage: Arc<AttachmentStorage>,
}

impl HealthService {
    pub fn new(repository: Arc<dyn ClaimRepository>, storage: Arc<AttachmentStorage>) -> Self {
        Self {
            repository,
            storage,
        }
    }

    pub async fn check(&self) -> HealthResponseDto {
        let database = match self.repository.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Health check: database unreachable: {}", e);
                false
            }
        };

        let upload_dir = self.storage.is_accessible().await;
        if !upload_dir {
            warn!(
                "Health check: upload directory {} is not accessible",
                self.storage.dir().display()
            );
        }

        let database = ComponentStatus::from_check(database);
        let upload_dir = ComponentStatus::from_check(upload_dir);
        let healthy = database == ComponentStatus::Up && upload_dir == ComponentStatus::Up;

        HealthResponseDto {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            database,
            upload_dir,
            timestamp: Utc::now(),
        }
    }
}
