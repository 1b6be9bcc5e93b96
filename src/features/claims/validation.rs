//! Pure checks run before any persistence attempt.

use chrono::NaiveDate;
use validator::{Validate, ValidationErrors};

use crate::core::config::UploadConfig;
use crate::features::claims::dtos::SubmitClaimDto;
use crate::features::claims::models::NewClaim;
use crate::shared::constants::{
    DEFAULT_ALLOWED_MIME_TYPES, DEFAULT_MAX_ATTACHMENTS, DEFAULT_MAX_ATTACHMENT_SIZE,
    MAX_FILE_NAME_LEN,
};
use crate::shared::validation::parse_claim_amount;

/// Field order used when reporting validation errors
const SUBMISSION_FIELDS: [&str; 6] = [
    "employee_id",
    "employee_name",
    "title",
    "amount",
    "category",
    "description",
];

/// Per-request attachment limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentLimits {
    pub max_file_size: usize,
    pub max_files: usize,
    pub allowed_mime_types: Vec<String>,
}

impl Default for AttachmentLimits {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_ATTACHMENT_SIZE,
            max_files: DEFAULT_MAX_ATTACHMENTS,
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl AttachmentLimits {
    pub fn from_config(config: &UploadConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            max_files: config.max_files,
            allowed_mime_types: config.allowed_mime_types.clone(),
        }
    }

    pub fn is_mime_type_allowed(&self, mime_type: &str) -> bool {
        self.allowed_mime_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(mime_type))
    }

    /// Request body ceiling for the submission route: every file at full size
    /// plus headroom for the text fields and multipart framing.
    pub fn max_request_body_size(&self) -> usize {
        self.max_file_size
            .saturating_mul(self.max_files.max(1))
            .saturating_add(1024 * 1024)
    }
}

/// What is known about an attachment before it is written anywhere
#[derive(Debug, Clone, Copy)]
pub struct AttachmentDescriptor<'a> {
    pub file_name: &'a str,
    pub mime_type: &'a str,
    pub size: usize,
}

pub fn validate_attachment_count(count: usize, limits: &AttachmentLimits) -> Result<(), String> {
    if count > limits.max_files {
        return Err(format!(
            "Too many attachments: at most {} files are allowed",
            limits.max_files
        ));
    }
    Ok(())
}

pub fn validate_attachment(
    attachment: &AttachmentDescriptor<'_>,
    limits: &AttachmentLimits,
) -> Result<(), String> {
    let name = attachment.file_name;

    if name.chars().count() > MAX_FILE_NAME_LEN {
        return Err(format!(
            "Attachment file name exceeds {} characters",
            MAX_FILE_NAME_LEN
        ));
    }

    if !limits.is_mime_type_allowed(attachment.mime_type) {
        return Err(format!(
            "File type '{}' of '{}' is not allowed. Allowed types: {}",
            attachment.mime_type,
            name,
            limits.allowed_mime_types.join(", ")
        ));
    }

    if attachment.size == 0 {
        return Err(format!("Attachment '{}' is empty", name));
    }

    if attachment.size > limits.max_file_size {
        return Err(format!(
            "Attachment '{}' is too large. Maximum size is {} bytes ({} MB)",
            name,
            limits.max_file_size,
            limits.max_file_size / 1024 / 1024
        ));
    }

    Ok(())
}

/// Check every attachment and the count, collecting all problems
pub fn validate_attachments<'a>(
    attachments: impl ExactSizeIterator<Item = AttachmentDescriptor<'a>>,
    limits: &AttachmentLimits,
) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    if let Err(e) = validate_attachment_count(attachments.len(), limits) {
        errors.push(e);
    }
    errors.extend(attachments.filter_map(|a| validate_attachment(&a, limits).err()));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a submission and turn it into a claim dated `date`.
///
/// Every problem is reported, not just the first one.
pub fn validate_submission(payload: SubmitClaimDto, date: NaiveDate) -> Result<NewClaim, Vec<String>> {
    let payload = payload.normalized();

    let mut errors = match payload.validate() {
        Ok(()) => Vec::new(),
        Err(e) => collect_messages(&e),
    };

    let amount = if payload.amount.is_empty() {
        None
    } else {
        match parse_claim_amount(&payload.amount) {
            Ok(amount) => Some(amount),
            Err(e) => {
                errors.push(e);
                None
            }
        }
    };

    match amount {
        Some(amount) if errors.is_empty() => Ok(NewClaim {
            employee_id: payload.employee_id,
            employee_name: payload.employee_name,
            title: payload.title,
            date,
            amount,
            category: payload.category,
            description: payload.description,
        }),
        _ => Err(errors),
    }
}

fn collect_messages(errors: &ValidationErrors) -> Vec<String> {
    let fields = errors.field_errors();
    SUBMISSION_FIELDS
        .iter()
        .filter_map(|field| fields.get(*field).map(|errs| (*field, errs)))
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect()
}
