use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;

/// Claim review status matching the `claim_status` database enum
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(type_name = "claim_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimStatus::Pending => write!(f, "pending"),
            ClaimStatus::Approved => write!(f, "approved"),
            ClaimStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Database model for claims
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Claim {
    pub id: i32,
    pub employee_id: String,
    pub employee_name: String,
    pub title: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    pub status: ClaimStatus,
    pub response: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated claim ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewClaim {
    pub employee_id: String,
    pub employee_name: String,
    pub title: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: String,
    pub description: String,
}
