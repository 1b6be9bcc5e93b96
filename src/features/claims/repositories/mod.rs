//! Persistence seam for claims.
//!
//! `ClaimRepository` covers single-statement reads and writes; anything that
//! must be atomic goes through a `ClaimTransaction` obtained from `begin`.
//! Dropping a transaction without committing rolls it back.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::features::claims::models::{Claim, ClaimAttachment, ClaimStatus, NewClaim};
use crate::modules::storage::StagedFile;

mod postgres;

#[cfg(test)]
pub mod memory;

pub use postgres::PgClaimRepository;

/// Unique constraint guarding one claim per employee per day
pub const CLAIM_DAY_CONSTRAINT: &str = "claims_employee_day_unique";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unique constraint violated: {}", .constraint.as_deref().unwrap_or("unknown"))]
    UniqueViolation { constraint: Option<String> },

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    pub fn is_unique_violation_of(&self, name: &str) -> bool {
        matches!(
            self,
            StoreError::UniqueViolation { constraint: Some(c) } if c == name
        )
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // SQLSTATE 23505
            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation {
                    constraint: db_err.constraint().map(str::to_string),
                };
            }
        }
        StoreError::Database(err)
    }
}

#[async_trait]
pub trait ClaimRepository: Send + Sync {
    /// Open a transaction
    async fn begin(&self) -> Result<Box<dyn ClaimTransaction>, StoreError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Claim>, StoreError>;

    /// One page of claims, newest first, with the total number of claims
    async fn list_page(&self, offset: i64, limit: i64) -> Result<(Vec<Claim>, i64), StoreError>;

    /// Claims of one employee, most recent date first
    async fn list_by_employee(&self, employee_id: &str) -> Result<Vec<Claim>, StoreError>;

    /// Attachments of all given claims, in upload order
    async fn attachments_for(&self, claim_ids: &[i32])
        -> Result<Vec<ClaimAttachment>, StoreError>;

    /// Set status and response; `None` when the claim does not exist
    async fn update_status(
        &self,
        id: i32,
        status: ClaimStatus,
        response: &str,
    ) -> Result<Option<Claim>, StoreError>;

    /// Round trip to the store
    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ClaimTransaction: Send {
    async fn count_claims(&mut self) -> Result<i64, StoreError>;

    async fn find_claim_for_day(
        &mut self,
        employee_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Claim>, StoreError>;

    async fn insert_claim(&mut self, claim: &NewClaim) -> Result<Claim, StoreError>;

    async fn insert_attachment(
        &mut self,
        claim_id: i32,
        file: &StagedFile,
    ) -> Result<ClaimAttachment, StoreError>;

    async fn attachments(&mut self, claim_id: i32) -> Result<Vec<ClaimAttachment>, StoreError>;

    async fn update_status(
        &mut self,
        id: i32,
        status: ClaimStatus,
        response: &str,
    ) -> Result<Option<Claim>, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
