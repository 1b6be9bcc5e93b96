use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::features::claims::models::{ClaimStatus, NewClaim};

/// A claim inserted by development seeding, with its review outcome
pub struct SampleClaim {
    pub claim: NewClaim,
    pub status: ClaimStatus,
    pub response: &'static str,
}

#[allow(clippy::too_many_arguments)]
fn sample(
    employee_id: &str,
    employee_name: &str,
    title: &str,
    (year, month, day): (i32, u32, u32),
    amount_cents: i64,
    category: &str,
    description: &str,
    status: ClaimStatus,
    response: &'static str,
) -> Option<SampleClaim> {
    Some(SampleClaim {
        claim: NewClaim {
            employee_id: employee_id.to_string(),
            employee_name: employee_name.to_string(),
            title: title.to_string(),
            date: NaiveDate::from_ymd_opt(year, month, day)?,
            amount: Decimal::new(amount_cents, 2),
            category: category.to_string(),
            description: description.to_string(),
        },
        status,
        response,
    })
}

pub fn sample_claims() -> Vec<SampleClaim> {
    [
        sample(
            "ATS0123",
            "Veera",
            "Travel Expense Reimbursement",
            (2024, 5, 15),
            3_750_050,
            "Travel",
            "Expenses for client meeting in Mumbai including flight, hotel, and meals.",
            ClaimStatus::Pending,
            "",
        ),
        sample(
            "ATS0456",
            "Raghava",
            "Office Supplies Purchase",
            (2024, 5, 10),
            1_045_030,
            "Office Supplies",
            "Purchased notebooks, pens, and printer paper for the marketing department.",
            ClaimStatus::Approved,
            "Approved. Reimbursement will be processed in the next payroll cycle.",
        ),
        sample(
            "ATS0124",
            "Pavan",
            "Training Course Fee",
            (2024, 5, 5),
            6_250_000,
            "Training",
            "Fee for Advanced Project Management certification course.",
            ClaimStatus::Rejected,
            "Rejected. This training was not pre-approved by your department manager.",
        ),
        sample(
            "ATS0789",
            "Priya Sharma",
            "Laptop Purchase",
            (2024, 5, 18),
            8_500_000,
            "Equipment",
            "New MacBook Pro for design team member",
            ClaimStatus::Pending,
            "",
        ),
        sample(
            "ATS0345",
            "Rahul Patel",
            "Medical Checkup",
            (2024, 5, 12),
            500_000,
            "Medical",
            "Annual health checkup at Apollo Hospital",
            ClaimStatus::Approved,
            "Approved as per company health policy",
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}
