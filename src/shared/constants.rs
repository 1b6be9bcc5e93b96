/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// ATTACHMENT LIMITS
// =============================================================================

/// Default maximum size of a single attachment in bytes (5MB)
pub const DEFAULT_MAX_ATTACHMENT_SIZE: usize = 5 * 1024 * 1024;

/// Default maximum number of attachments per claim
pub const DEFAULT_MAX_ATTACHMENTS: usize = 5;

/// MIME types accepted for claim attachments unless overridden by config
pub const DEFAULT_ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

// =============================================================================
// CLAIM FIELD LIMITS (mirror the column sizes in migrations/)
// =============================================================================

pub const MAX_EMPLOYEE_NAME_LEN: u64 = 100;
pub const MAX_TITLE_LEN: u64 = 100;
pub const MAX_CATEGORY_LEN: u64 = 50;
pub const MAX_FILE_NAME_LEN: usize = 255;

/// Reserved employee id that never identifies a real employee
pub const RESERVED_EMPLOYEE_ID: &str = "ATS0000";
