use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for claim attachments
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ClaimAttachment {
    pub id: i32,
    pub claim_id: i32,
    /// Original file name as uploaded
    pub file_name: String,
    /// Generated storage name under the upload directory
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
}
