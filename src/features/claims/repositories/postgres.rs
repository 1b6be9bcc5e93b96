use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgExecutor, PgPool, Postgres, Transaction};

use super::{ClaimRepository, ClaimTransaction, StoreError};
use crate::features::claims::models::{Claim, ClaimAttachment, ClaimStatus, NewClaim};
use crate::modules::storage::StagedFile;

const CLAIM_COLUMNS: &str = "id, employee_id, employee_name, title, date, amount, category, \
     description, status, response, created_at, updated_at";

const ATTACHMENT_COLUMNS: &str =
    "id, claim_id, file_name, file_path, file_size, mime_type, uploaded_at";

/// Postgres-backed claim store
#[derive(Debug, Clone)]
pub struct PgClaimRepository {
    pool: PgPool,
}

impl PgClaimRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Open Postgres transaction; rolled back on drop unless committed
pub struct PgClaimTransaction {
    tx: Transaction<'static, Postgres>,
}

async fn update_status_on<'e, E>(
    executor: E,
    id: i32,
    status: ClaimStatus,
    response: &str,
) -> Result<Option<Claim>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "UPDATE claims SET status = $1, response = $2, updated_at = NOW() \
         WHERE id = $3 RETURNING {}",
        CLAIM_COLUMNS
    );
    sqlx::query_as::<_, Claim>(&sql)
        .bind(status)
        .bind(response)
        .bind(id)
        .fetch_optional(executor)
        .await
}

#[async_trait]
impl ClaimRepository for PgClaimRepository {
    async fn begin(&self) -> Result<Box<dyn ClaimTransaction>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgClaimTransaction { tx }))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Claim>, StoreError> {
        let sql = format!("SELECT {} FROM claims WHERE id = $1", CLAIM_COLUMNS);
        let claim = sqlx::query_as::<_, Claim>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(claim)
    }

    async fn list_page(&self, offset: i64, limit: i64) -> Result<(Vec<Claim>, i64), StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM claims")
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT {} FROM claims ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
            CLAIM_COLUMNS
        );
        let claims = sqlx::query_as::<_, Claim>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((claims, total))
    }

    async fn list_by_employee(&self, employee_id: &str) -> Result<Vec<Claim>, StoreError> {
        let sql = format!(
            "SELECT {} FROM claims WHERE employee_id = $1 ORDER BY date DESC, id DESC",
            CLAIM_COLUMNS
        );
        let claims = sqlx::query_as::<_, Claim>(&sql)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(claims)
    }

    async fn attachments_for(
        &self,
        claim_ids: &[i32],
    ) -> Result<Vec<ClaimAttachment>, StoreError> {
        if claim_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM claim_attachments WHERE claim_id = ANY($1) ORDER BY claim_id, id",
            ATTACHMENT_COLUMNS
        );
        let attachments = sqlx::query_as::<_, ClaimAttachment>(&sql)
            .bind(claim_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(attachments)
    }

    async fn update_status(
        &self,
        id: i32,
        status: ClaimStatus,
        response: &str,
    ) -> Result<Option<Claim>, StoreError> {
        Ok(update_status_on(&self.pool, id, status, response).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ClaimTransaction for PgClaimTransaction {
    async fn count_claims(&mut self) -> Result<i64, StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM claims")
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(total)
    }

    async fn find_claim_for_day(
        &mut self,
        employee_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Claim>, StoreError> {
        let sql = format!(
            "SELECT {} FROM claims WHERE employee_id = $1 AND date = $2",
            CLAIM_COLUMNS
        );
        let claim = sqlx::query_as::<_, Claim>(&sql)
            .bind(employee_id)
            .bind(date)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(claim)
    }

    async fn insert_claim(&mut self, claim: &NewClaim) -> Result<Claim, StoreError> {
        let sql = format!(
            "INSERT INTO claims \
             (employee_id, employee_name, title, date, amount, category, description) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {}",
            CLAIM_COLUMNS
        );
        let inserted = sqlx::query_as::<_, Claim>(&sql)
            .bind(&claim.employee_id)
            .bind(&claim.employee_name)
            .bind(&claim.title)
            .bind(claim.date)
            .bind(claim.amount)
            .bind(&claim.category)
            .bind(&claim.description)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(inserted)
    }

    async fn insert_attachment(
        &mut self,
        claim_id: i32,
        file: &StagedFile,
    ) -> Result<ClaimAttachment, StoreError> {
        let sql = format!(
            "INSERT INTO claim_attachments (claim_id, file_name, file_path, file_size, mime_type) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {}",
            ATTACHMENT_COLUMNS
        );
        let attachment = sqlx::query_as::<_, ClaimAttachment>(&sql)
            .bind(claim_id)
            .bind(&file.original_name)
            .bind(&file.storage_name)
            .bind(file.size)
            .bind(&file.mime_type)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(attachment)
    }

    async fn attachments(&mut self, claim_id: i32) -> Result<Vec<ClaimAttachment>, StoreError> {
        let sql = format!(
            "SELECT {} FROM claim_attachments WHERE claim_id = $1 ORDER BY id",
            ATTACHMENT_COLUMNS
        );
        let attachments = sqlx::query_as::<_, ClaimAttachment>(&sql)
            .bind(claim_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(attachments)
    }

    async fn update_status(
        &mut self,
        id: i32,
        status: ClaimStatus,
        response: &str,
    ) -> Result<Option<Claim>, StoreError> {
        Ok(update_status_on(&mut *self.tx, id, status, response).await?)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
