#[cfg(test)]
use std::path::Path;

#[cfg(test)]
use fake::{faker::name::en::Name, Fake};
#[cfg(test)]
use tempfile::TempDir;

#[cfg(test)]
use crate::features::claims::dtos::SubmitClaimDto;
#[cfg(test)]
use crate::modules::storage::AttachmentStorage;

#[cfg(test)]
pub const TEST_BASE_URL: &str = "http://claims.test";

/// Temporary upload directory, removed when dropped
#[cfg(test)]
pub struct TempUploadDir {
    dir: TempDir,
}

#[cfg(test)]
impl TempUploadDir {
    pub fn new() -> Self {
        let dir = tempfile::Builder::new()
            .prefix("claims-portal-")
            .tempdir()
            .expect("create temp upload dir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn storage(&self) -> AttachmentStorage {
        AttachmentStorage::with_dir(self.path().to_path_buf(), TEST_BASE_URL)
    }

    pub async fn contains(&self, storage_name: &str) -> bool {
        tokio::fs::metadata(self.path().join(storage_name))
            .await
            .is_ok()
    }

    pub async fn file_count(&self) -> usize {
        let mut entries = tokio::fs::read_dir(self.path())
            .await
            .expect("read temp upload dir");
        let mut count = 0;
        while let Some(_entry) = entries.next_entry().await.expect("read dir entry") {
            count += 1;
        }
        count
    }
}

#[cfg(test)]
impl Default for TempUploadDir {
    fn default() -> Self {
        Self::new()
    }
}

/// A complete, valid submission for the given employee
#[cfg(test)]
pub fn claim_payload(employee_id: &str) -> SubmitClaimDto {
    SubmitClaimDto {
        employee_id: employee_id.to_string(),
        employee_name: Name().fake(),
        title: "Travel Expense Reimbursement".to_string(),
        amount: "37500.50".to_string(),
        category: "Travel".to_string(),
        description: "Client meeting in Mumbai including flight, hotel, and meals.".to_string(),
    }
}
