use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::core::error::{AppError, Result};
use crate::features::claims::dtos::{ClaimResponseDto, SubmitClaimDto, UpdateClaimStatusDto};
use crate::features::claims::models::{Claim, ClaimAttachment, NewClaim};
use crate::features::claims::repositories::{
    ClaimRepository, ClaimTransaction, StoreError, CLAIM_DAY_CONSTRAINT,
};
use crate::features::claims::services::sample_data::sample_claims;
use crate::features::claims::validation::{
    validate_attachments, validate_submission, AttachmentDescriptor, AttachmentLimits,
};
use crate::modules::storage::{AttachmentStorage, StagedFile, StorageError};
use crate::shared::types::{Meta, PaginationQuery};
use crate::shared::validation::is_valid_employee_id;

#[derive(Debug, Error)]
pub enum SubmitClaimError {
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("A claim has already been submitted for employee {employee_id} on {date}")]
    DuplicateClaim {
        employee_id: String,
        date: NaiveDate,
    },

    #[error("Failed to persist claim: {0}")]
    Persistence(#[source] StoreError),

    #[error("Failed to persist attachment '{file_name}': {source}")]
    AttachmentPersistence {
        file_name: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to store attachment: {0}")]
    Storage(#[from] StorageError),
}

impl From<SubmitClaimError> for AppError {
    fn from(err: SubmitClaimError) -> Self {
        match err {
            SubmitClaimError::Validation(errors) => AppError::Validation(errors),
            SubmitClaimError::DuplicateClaim { .. } => AppError::Conflict(err.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(e) => AppError::Database(e),
            StoreError::UniqueViolation { .. } => AppError::Conflict(err.to_string()),
        }
    }
}

/// A file part received with a submission, not yet written to disk
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl UploadedFile {
    fn descriptor(&self) -> AttachmentDescriptor<'_> {
        AttachmentDescriptor {
            file_name: &self.file_name,
            mime_type: &self.content_type,
            size: self.data.len(),
        }
    }
}

/// Service for claim submission and review
pub struct ClaimService {
    repository: Arc<dyn ClaimRepository>,
    storage: Arc<AttachmentStorage>,
    limits: AttachmentLimits,
}

impl ClaimService {
    pub fn new(
        repository: Arc<dyn ClaimRepository>,
        storage: Arc<AttachmentStorage>,
        limits: AttachmentLimits,
    ) -> Self {
        Self {
            repository,
            storage,
            limits,
        }
    }

    pub fn limits(&self) -> &AttachmentLimits {
        &self.limits
    }

    /// Validate every upload, then write them all to the staging area.
    ///
    /// Nothing is written unless all uploads pass. If a write fails midway,
    /// the files already written are removed again.
    pub async fn stage_uploads(
        &self,
        uploads: Vec<UploadedFile>,
    ) -> std::result::Result<Vec<StagedFile>, SubmitClaimError> {
        validate_attachments(uploads.iter().map(UploadedFile::descriptor), &self.limits)
            .map_err(SubmitClaimError::Validation)?;

        let mut staged = Vec::with_capacity(uploads.len());
        for upload in &uploads {
            match self
                .storage
                .stage(&upload.file_name, &upload.content_type, &upload.data)
                .await
            {
                Ok(file) => staged.push(file),
                Err(e) => {
                    error!("Failed to stage attachment '{}': {}", upload.file_name, e);
                    self.storage.cleanup(&staged).await;
                    return Err(e.into());
                }
            }
        }
        Ok(staged)
    }

    /// Persist a claim and its staged attachments in one transaction.
    ///
    /// The claim is dated with the current UTC day. On any failure the
    /// staged files are deleted before the error is returned.
    pub async fn submit_claim(
        &self,
        payload: SubmitClaimDto,
        staged: Vec<StagedFile>,
    ) -> std::result::Result<ClaimResponseDto, SubmitClaimError> {
        self.submit_claim_on(payload, staged, Utc::now().date_naive())
            .await
    }

    async fn submit_claim_on(
        &self,
        payload: SubmitClaimDto,
        staged: Vec<StagedFile>,
        date: NaiveDate,
    ) -> std::result::Result<ClaimResponseDto, SubmitClaimError> {
        match self.persist_claim(payload, &staged, date).await {
            Ok((claim, attachments)) => {
                info!(
                    "Claim {} submitted by {} with {} attachment(s)",
                    claim.id,
                    claim.employee_id,
                    attachments.len()
                );
                Ok(self.to_response(claim, attachments))
            }
            Err(err) => {
                debug!("Claim submission failed: {}", err);
                let failed = self.storage.cleanup(&staged).await;
                if failed > 0 {
                    warn!(
                        "{} staged attachment(s) could not be removed after a failed submission",
                        failed
                    );
                }
                Err(err)
            }
        }
    }

    async fn persist_claim(
        &self,
        payload: SubmitClaimDto,
        staged: &[StagedFile],
        date: NaiveDate,
    ) -> std::result::Result<(Claim, Vec<ClaimAttachment>), SubmitClaimError> {
        let new_claim = validate_submission(payload, date).map_err(SubmitClaimError::Validation)?;

        let descriptors = staged.iter().map(|f| AttachmentDescriptor {
            file_name: &f.original_name,
            mime_type: &f.mime_type,
            size: usize::try_from(f.size).unwrap_or(0),
        });
        validate_attachments(descriptors, &self.limits).map_err(SubmitClaimError::Validation)?;

        let mut tx = self
            .repository
            .begin()
            .await
            .map_err(SubmitClaimError::Persistence)?;

        let written = match write_claim(tx.as_mut(), &new_claim, staged).await {
            Ok(written) => written,
            Err(err) => {
                if let Err(e) = tx.rollback().await {
                    warn!("Rollback of claim submission failed: {}", e);
                }
                return Err(err);
            }
        };

        tx.commit().await.map_err(SubmitClaimError::Persistence)?;
        Ok(written)
    }

    /// List claims, newest first
    pub async fn list_claims(
        &self,
        query: &PaginationQuery,
    ) -> Result<(Vec<ClaimResponseDto>, Meta)> {
        let (claims, total) = self
            .repository
            .list_page(query.offset(), query.limit())
            .await
            .map_err(|e| {
                error!("Failed to list claims: {}", e);
                AppError::from(e)
            })?;

        let claims = self.with_attachments(claims).await?;
        Ok((claims, Meta::paginated(total, query)))
    }

    /// Get a claim by id
    pub async fn get_claim(&self, id: i32) -> Result<ClaimResponseDto> {
        let claim = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Claim {} not found", id)))?;

        let mut claims = self.with_attachments(vec![claim]).await?;
        claims
            .pop()
            .ok_or_else(|| AppError::Internal(format!("Claim {} vanished while loading", id)))
    }

    /// Claims of one employee, most recent first
    pub async fn list_claims_by_employee(&self, employee_id: &str) -> Result<Vec<ClaimResponseDto>> {
        let employee_id = employee_id.trim();
        if !is_valid_employee_id(employee_id) {
            return Err(AppError::validation(format!(
                "Invalid employee ID format: '{}'. Expected ATS0 followed by 3 digits (e.g., ATS0123)",
                employee_id
            )));
        }

        let claims = self.repository.list_by_employee(employee_id).await?;
        self.with_attachments(claims).await
    }

    /// Record a review decision
    pub async fn update_status(&self, id: i32, dto: UpdateClaimStatusDto) -> Result<ClaimResponseDto> {
        let response = dto.response.unwrap_or_default();
        let claim = self
            .repository
            .update_status(id, dto.status, &response)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Claim {} not found", id)))?;

        info!("Claim {} marked {}", claim.id, claim.status);

        let mut claims = self.with_attachments(vec![claim]).await?;
        claims
            .pop()
            .ok_or_else(|| AppError::Internal(format!("Claim {} vanished while loading", id)))
    }

    /// Insert the sample claims when no claims exist yet.
    ///
    /// Returns the number of claims inserted.
    pub async fn seed_sample_claims(&self) -> std::result::Result<usize, StoreError> {
        let mut tx = self.repository.begin().await?;

        if tx.count_claims().await? > 0 {
            tx.rollback().await?;
            debug!("Claims table not empty, skipping sample data");
            return Ok(0);
        }

        let samples = sample_claims();
        for sample in &samples {
            let claim = tx.insert_claim(&sample.claim).await?;
            if sample.status != claim.status || !sample.response.is_empty() {
                tx.update_status(claim.id, sample.status, sample.response)
                    .await?;
            }
        }
        tx.commit().await?;

        info!("Seeded {} sample claims", samples.len());
        Ok(samples.len())
    }

    async fn with_attachments(&self, claims: Vec<Claim>) -> Result<Vec<ClaimResponseDto>> {
        let ids: Vec<i32> = claims.iter().map(|c| c.id).collect();
        let mut by_claim: HashMap<i32, Vec<ClaimAttachment>> = HashMap::new();
        for attachment in self.repository.attachments_for(&ids).await? {
            by_claim
                .entry(attachment.claim_id)
                .or_default()
                .push(attachment);
        }

        Ok(claims
            .into_iter()
            .map(|claim| {
                let attachments = by_claim.remove(&claim.id).unwrap_or_default();
                self.to_response(claim, attachments)
            })
            .collect())
    }

    fn to_response(&self, claim: Claim, attachments: Vec<ClaimAttachment>) -> ClaimResponseDto {
        ClaimResponseDto::from_parts(claim, attachments, |name| self.storage.public_url(name))
    }
}

/// Duplicate check, claim insert, attachment inserts and read-back, all on
/// one open transaction.
async fn write_claim(
    tx: &mut dyn ClaimTransaction,
    claim: &NewClaim,
    staged: &[StagedFile],
) -> std::result::Result<(Claim, Vec<ClaimAttachment>), SubmitClaimError> {
    let duplicate = || SubmitClaimError::DuplicateClaim {
        employee_id: claim.employee_id.clone(),
        date: claim.date,
    };

    if tx
        .find_claim_for_day(&claim.employee_id, claim.date)
        .await
        .map_err(SubmitClaimError::Persistence)?
        .is_some()
    {
        return Err(duplicate());
    }

    let inserted = tx.insert_claim(claim).await.map_err(|e| {
        if e.is_unique_violation_of(CLAIM_DAY_CONSTRAINT) {
            duplicate()
        } else {
            SubmitClaimError::Persistence(e)
        }
    })?;

    for file in staged {
        tx.insert_attachment(inserted.id, file)
            .await
            .map_err(|source| SubmitClaimError::AttachmentPersistence {
                file_name: file.original_name.clone(),
                source,
            })?;
    }

    let attachments = tx
        .attachments(inserted.id)
        .await
        .map_err(SubmitClaimError::Persistence)?;

    Ok((inserted, attachments))
}
