use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::shared::constants::RESERVED_EMPLOYEE_ID;

lazy_static! {
    /// Regex for employee identifiers: "ATS0" followed by three digits
    /// - Valid: "ATS0123", "ATS0999", "ATS0001"
    /// - Invalid: "ATS1234", "ats0123", "ATS012", "ATS01234"
    pub static ref EMPLOYEE_ID_REGEX: Regex = Regex::new(r"^ATS0\d{3}$").unwrap();

    /// Largest value a NUMERIC(10, 2) column holds
    pub static ref MAX_CLAIM_AMOUNT: Decimal = Decimal::new(9_999_999_999, 2);
}

/// Employee ids must match the pattern and must not be the all-zero id
pub fn is_valid_employee_id(employee_id: &str) -> bool {
    EMPLOYEE_ID_REGEX.is_match(employee_id) && employee_id != RESERVED_EMPLOYEE_ID
}

/// Parse a claim amount, requiring a strictly positive value that fits the
/// amount column. The result is rounded to cents.
pub fn parse_claim_amount(raw: &str) -> Result<Decimal, String> {
    let amount = Decimal::from_str(raw.trim())
        .or_else(|_| Decimal::from_scientific(raw.trim()))
        .map_err(|_| "Amount must be a positive number".to_string())?
        .round_dp(2);

    if amount <= Decimal::ZERO {
        return Err("Amount must be a positive number".to_string());
    }
    if amount > *MAX_CLAIM_AMOUNT {
        return Err(format!("Amount must not exceed {}", *MAX_CLAIM_AMOUNT));
    }

    Ok(amount)
}
