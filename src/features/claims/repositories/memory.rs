//! In-memory claim store with fault injection, for tests.
//!
//! A transaction works on a private copy of the state and, on commit, merges
//! only the rows it inserted or updated into the shared state. Ids come from
//! shared counters, so like database sequences they are never reused.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use super::{ClaimRepository, ClaimTransaction, StoreError, CLAIM_DAY_CONSTRAINT};
use crate::features::claims::models::{Claim, ClaimAttachment, ClaimStatus, NewClaim};
use crate::modules::storage::StagedFile;

const ATTACHMENT_PATH_CONSTRAINT: &str = "claim_attachments_file_path_key";

#[derive(Debug, Clone, Default)]
struct State {
    claims: Vec<Claim>,
    attachments: Vec<ClaimAttachment>,
    last_claim_id: i32,
    last_attachment_id: i32,
}

#[derive(Debug, Clone, Default)]
struct Faults {
    /// Zero-based index of the attachment insert that fails
    fail_attachment_insert_at: Option<usize>,
    fail_commit: bool,
    fail_rollback: bool,
    /// Pretend no same-day claim exists, as a concurrent request would see it
    skip_duplicate_check: bool,
    fail_reads: bool,
}

#[derive(Clone, Default)]
pub struct MemoryClaimRepository {
    state: Arc<Mutex<State>>,
    faults: Arc<Mutex<Faults>>,
}

fn injected(what: &str) -> StoreError {
    StoreError::Database(sqlx::Error::Protocol(format!("injected {} failure", what)))
}

impl MemoryClaimRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn faults(&self) -> Faults {
        self.faults.lock().unwrap().clone()
    }

    pub fn fail_attachment_insert_at(&self, index: usize) {
        self.faults.lock().unwrap().fail_attachment_insert_at = Some(index);
    }

    pub fn fail_commit(&self) {
        self.faults.lock().unwrap().fail_commit = true;
    }

    pub fn fail_rollback(&self) {
        self.faults.lock().unwrap().fail_rollback = true;
    }

    pub fn skip_duplicate_check(&self) {
        self.faults.lock().unwrap().skip_duplicate_check = true;
    }

    pub fn fail_reads(&self) {
        self.faults.lock().unwrap().fail_reads = true;
    }

    pub fn claims(&self) -> Vec<Claim> {
        self.state().claims.clone()
    }

    pub fn attachments(&self) -> Vec<ClaimAttachment> {
        self.state().attachments.clone()
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.faults().fail_reads {
            return Err(injected("read"));
        }
        Ok(())
    }
}

impl State {
    fn update_status(&mut self, id: i32, status: ClaimStatus, response: &str) -> Option<Claim> {
        let claim = self.claims.iter_mut().find(|c| c.id == id)?;
        claim.status = status;
        claim.response = response.to_string();
        claim.updated_at = Utc::now();
        Some(claim.clone())
    }
}

#[async_trait]
impl ClaimRepository for MemoryClaimRepository {
    async fn begin(&self) -> Result<Box<dyn ClaimTransaction>, StoreError> {
        Ok(Box::new(MemoryClaimTransaction {
            working: self.state().clone(),
            shared: self.state.clone(),
            faults: self.faults(),
            attachment_inserts: 0,
            inserted_claims: Vec::new(),
            updated_claims: Vec::new(),
            inserted_attachments: Vec::new(),
        }))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Claim>, StoreError> {
        self.check_reads()?;
        Ok(self.state().claims.iter().find(|c| c.id == id).cloned())
    }

    async fn list_page(&self, offset: i64, limit: i64) -> Result<(Vec<Claim>, i64), StoreError> {
        self.check_reads()?;
        let mut claims = self.claims();
        claims.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        let total = claims.len() as i64;
        let page = claims
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn list_by_employee(&self, employee_id: &str) -> Result<Vec<Claim>, StoreError> {
        self.check_reads()?;
        let mut claims: Vec<Claim> = self
            .claims()
            .into_iter()
            .filter(|c| c.employee_id == employee_id)
            .collect();
        claims.sort_by(|a, b| (b.date, b.id).cmp(&(a.date, a.id)));
        Ok(claims)
    }

    async fn attachments_for(
        &self,
        claim_ids: &[i32],
    ) -> Result<Vec<ClaimAttachment>, StoreError> {
        self.check_reads()?;
        Ok(self
            .attachments()
            .into_iter()
            .filter(|a| claim_ids.contains(&a.claim_id))
            .collect())
    }

    async fn update_status(
        &self,
        id: i32,
        status: ClaimStatus,
        response: &str,
    ) -> Result<Option<Claim>, StoreError> {
        Ok(self.state().update_status(id, status, response))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_reads()
    }
}

pub struct MemoryClaimTransaction {
    working: State,
    shared: Arc<Mutex<State>>,
    faults: Faults,
    attachment_inserts: usize,
    inserted_claims: Vec<i32>,
    updated_claims: Vec<i32>,
    inserted_attachments: Vec<i32>,
}

impl MemoryClaimTransaction {
    fn next_claim_id(&self) -> i32 {
        let mut shared = self.shared.lock().unwrap();
        shared.last_claim_id += 1;
        shared.last_claim_id
    }

    fn next_attachment_id(&self) -> i32 {
        let mut shared = self.shared.lock().unwrap();
        shared.last_attachment_id += 1;
        shared.last_attachment_id
    }
}

#[async_trait]
impl ClaimTransaction for MemoryClaimTransaction {
    async fn count_claims(&mut self) -> Result<i64, StoreError> {
        Ok(self.working.claims.len() as i64)
    }

    async fn find_claim_for_day(
        &mut self,
        employee_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Claim>, StoreError> {
        if self.faults.skip_duplicate_check {
            return Ok(None);
        }
        Ok(self
            .working
            .claims
            .iter()
            .find(|c| c.employee_id == employee_id && c.date == date)
            .cloned())
    }

    async fn insert_claim(&mut self, claim: &NewClaim) -> Result<Claim, StoreError> {
        let taken = self
            .working
            .claims
            .iter()
            .any(|c| c.employee_id == claim.employee_id && c.date == claim.date);
        if taken {
            return Err(StoreError::UniqueViolation {
                constraint: Some(CLAIM_DAY_CONSTRAINT.to_string()),
            });
        }

        let now = Utc::now();
        let inserted = Claim {
            id: self.next_claim_id(),
            employee_id: claim.employee_id.clone(),
            employee_name: claim.employee_name.clone(),
            title: claim.title.clone(),
            date: claim.date,
            amount: claim.amount,
            category: claim.category.clone(),
            description: claim.description.clone(),
            status: ClaimStatus::Pending,
            response: String::new(),
            created_at: now,
            updated_at: now,
        };
        self.working.claims.push(inserted.clone());
        self.inserted_claims.push(inserted.id);
        Ok(inserted)
    }

    async fn insert_attachment(
        &mut self,
        claim_id: i32,
        file: &StagedFile,
    ) -> Result<ClaimAttachment, StoreError> {
        let index = self.attachment_inserts;
        self.attachment_inserts += 1;
        if self.faults.fail_attachment_insert_at == Some(index) {
            return Err(injected("attachment insert"));
        }
        if self
            .working
            .attachments
            .iter()
            .any(|a| a.file_path == file.storage_name)
        {
            return Err(StoreError::UniqueViolation {
                constraint: Some(ATTACHMENT_PATH_CONSTRAINT.to_string()),
            });
        }

        let attachment = ClaimAttachment {
            id: self.next_attachment_id(),
            claim_id,
            file_name: file.original_name.clone(),
            file_path: file.storage_name.clone(),
            file_size: file.size,
            mime_type: file.mime_type.clone(),
            uploaded_at: Utc::now(),
        };
        self.working.attachments.push(attachment.clone());
        self.inserted_attachments.push(attachment.id);
        Ok(attachment)
    }

    async fn attachments(&mut self, claim_id: i32) -> Result<Vec<ClaimAttachment>, StoreError> {
        Ok(self
            .working
            .attachments
            .iter()
            .filter(|a| a.claim_id == claim_id)
            .cloned()
            .collect())
    }

    async fn update_status(
        &mut self,
        id: i32,
        status: ClaimStatus,
        response: &str,
    ) -> Result<Option<Claim>, StoreError> {
        let updated = self.working.update_status(id, status, response);
        if updated.is_some() {
            self.updated_claims.push(id);
        }
        Ok(updated)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        if self.faults.fail_commit {
            return Err(injected("commit"));
        }
        let MemoryClaimTransaction {
            working,
            shared,
            inserted_claims,
            updated_claims,
            inserted_attachments,
            ..
        } = *self;
        let mut state = shared.lock().unwrap();

        let new_claims: Vec<Claim> = working
            .claims
            .iter()
            .filter(|c| inserted_claims.contains(&c.id))
            .cloned()
            .collect();
        let conflict = new_claims.iter().any(|new| {
            state
                .claims
                .iter()
                .any(|c| c.employee_id == new.employee_id && c.date == new.date)
        });
        if conflict {
            return Err(StoreError::UniqueViolation {
                constraint: Some(CLAIM_DAY_CONSTRAINT.to_string()),
            });
        }

        state.claims.extend(new_claims);
        for claim in working
            .claims
            .iter()
            .filter(|c| updated_claims.contains(&c.id) && !inserted_claims.contains(&c.id))
        {
            if let Some(row) = state.claims.iter_mut().find(|c| c.id == claim.id) {
                *row = claim.clone();
            }
        }
        state.attachments.extend(
            working
                .attachments
                .into_iter()
                .filter(|a| inserted_attachments.contains(&a.id)),
        );
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        if self.faults.fail_rollback {
            return Err(injected("rollback"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn new_claim(employee_id: &str) -> NewClaim {
        NewClaim {
            employee_id: employee_id.to_string(),
            employee_name: "Raghava".to_string(),
            title: "Team Lunch".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 15).unwrap(),
            amount: Decimal::new(450075, 2),
            category: "Meals".to_string(),
            description: "Quarterly team lunch".to_string(),
        }
    }

    #[tokio::test]
    async fn test_commit_keeps_updates_made_during_transaction() {
        let repo = MemoryClaimRepository::new();
        let mut tx = repo.begin().await.unwrap();
        let first = tx.insert_claim(&new_claim("ATS0101")).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = repo.begin().await.unwrap();
        let second = tx.insert_claim(&new_claim("ATS0102")).await.unwrap();
        repo.update_status(first.id, ClaimStatus::Approved, "Looks good")
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let claims = repo.claims();
        assert_eq!(claims.len(), 2);
        let approved = claims.iter().find(|c| c.id == first.id).unwrap();
        assert_eq!(approved.status, ClaimStatus::Approved);
        assert_eq!(approved.response, "Looks good");
        assert!(claims.iter().any(|c| c.id == second.id));
    }

    #[tokio::test]
    async fn test_concurrent_same_day_commits_conflict() {
        let repo = MemoryClaimRepository::new();
        let mut a = repo.begin().await.unwrap();
        let mut b = repo.begin().await.unwrap();
        let first = a.insert_claim(&new_claim("ATS0101")).await.unwrap();
        let second = b.insert_claim(&new_claim("ATS0101")).await.unwrap();
        assert_ne!(first.id, second.id);

        a.commit().await.unwrap();
        let err = b.commit().await.unwrap_err();
        assert!(err.is_unique_violation_of(CLAIM_DAY_CONSTRAINT));
        assert_eq!(repo.claims().len(), 1);
    }
}
