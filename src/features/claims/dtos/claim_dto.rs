use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::features::claims::models::{Claim, ClaimAttachment, ClaimStatus};
use crate::shared::constants::{MAX_CATEGORY_LEN, MAX_EMPLOYEE_NAME_LEN, MAX_TITLE_LEN};
use crate::shared::validation::is_valid_employee_id;

/// Text fields of a claim submission.
///
/// Assembled by the handler from multipart form fields; attachments travel
/// separately as staged files. `amount` is kept as text until validation so
/// malformed input surfaces as a validation error, not a parse failure.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SubmitClaimDto {
    #[validate(
        length(min = 1, message = "employee_id is required"),
        custom(function = "validate_employee_id")
    )]
    pub employee_id: String,

    #[validate(length(
        min = 1,
        max = MAX_EMPLOYEE_NAME_LEN,
        message = "employee_name is required and must not exceed 100 characters"
    ))]
    pub employee_name: String,

    #[validate(length(
        min = 1,
        max = MAX_TITLE_LEN,
        message = "title is required and must not exceed 100 characters"
    ))]
    pub title: String,

    #[validate(length(min = 1, message = "amount is required"))]
    pub amount: String,

    #[validate(length(
        min = 1,
        max = MAX_CATEGORY_LEN,
        message = "category is required and must not exceed 50 characters"
    ))]
    pub category: String,

    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
}

impl SubmitClaimDto {
    /// Trim surrounding whitespace so blank fields count as missing
    pub fn normalized(self) -> Self {
        Self {
            employee_id: self.employee_id.trim().to_string(),
            employee_name: self.employee_name.trim().to_string(),
            title: self.title.trim().to_string(),
            amount: self.amount.trim().to_string(),
            category: self.category.trim().to_string(),
            description: self.description.trim().to_string(),
        }
    }
}

fn validate_employee_id(employee_id: &str) -> Result<(), ValidationError> {
    // Emptiness is reported by the length rule
    if employee_id.is_empty() || is_valid_employee_id(employee_id) {
        return Ok(());
    }
    Err(ValidationError::new("employee_id_format").with_message(
        "Invalid employee ID format: expected ATS0 followed by 3 digits (e.g., ATS0123), ATS0000 is reserved"
            .into(),
    ))
}

/// Submit claim request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
#[schema(rename_all = "camelCase")]
pub struct SubmitClaimFormDto {
    /// Employee identifier (`employee_id` is accepted too)
    #[schema(example = "ATS0123")]
    pub employee_id: String,
    /// Employee name (`employee_name` is accepted too)
    #[schema(example = "Veera")]
    pub employee_name: String,
    #[schema(example = "Travel Expense Reimbursement")]
    pub title: String,
    #[schema(example = "37500.50")]
    pub amount: String,
    #[schema(example = "Travel")]
    pub category: String,
    pub description: String,
    /// Up to 5 files (JPEG, PNG, PDF, DOC, DOCX; 5MB each)
    #[schema(format = Binary)]
    pub attachments: Vec<String>,
}

/// Attachment as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttachmentResponseDto {
    /// Original file name
    pub name: String,
    /// Public URL the file is served from
    pub url: String,
    /// Size in bytes
    pub size: i64,
    pub mime_type: String,
}

/// Response DTO for claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClaimResponseDto {
    pub id: i32,
    pub employee_id: String,
    pub employee_name: String,
    pub title: String,
    pub date: NaiveDate,
    #[schema(value_type = String, example = "37500.50")]
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    pub status: ClaimStatus,
    /// Reviewer response, empty until reviewed
    pub response: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub attachments: Vec<AttachmentResponseDto>,
}

impl ClaimResponseDto {
    /// Build the response, turning each stored file name into a public URL
    pub fn from_parts(
        claim: Claim,
        attachments: Vec<ClaimAttachment>,
        url_for: impl Fn(&str) -> String,
    ) -> Self {
        let attachments = attachments
            .into_iter()
            .map(|a| AttachmentResponseDto {
                url: url_for(&a.file_path),
                name: a.file_name,
                size: a.file_size,
                mime_type: a.mime_type,
            })
            .collect();

        Self {
            id: claim.id,
            employee_id: claim.employee_id,
            employee_name: claim.employee_name,
            title: claim.title,
            date: claim.date,
            amount: claim.amount,
            category: claim.category,
            description: claim.description,
            status: claim.status,
            response: claim.response,
            created_at: claim.created_at,
            updated_at: claim.updated_at,
            attachments,
        }
    }
}

/// Request DTO for reviewing a claim
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateClaimStatusDto {
    pub status: ClaimStatus,
    /// Reviewer response; omitted means empty
    #[serde(default)]
    pub response: Option<String>,
}
