use chrono::NaiveDate;

use super::errors::{BillingError, BillingResult};

pub const BILLING_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_billing_date(raw: &str) -> BillingResult<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BillingError::InvalidDate("empty date".to_string()));
    }

    NaiveDate::parse_from_str(trimmed, BILLING_DATE_FORMAT)
        .map_err(|err| BillingError::InvalidDate(format!("{trimmed}: {err}")))
}

pub fn require_date(value: Option<NaiveDate>, field: &str) -> BillingResult<NaiveDate> {
    value.ok_or_else(|| BillingError::InvalidDate(format!("{field} is missing")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(
            parse_billing_date("2024-03-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert_eq!(
            parse_billing_date(" 2024-12-31 ").unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
        );
    }

    #[test]
    fn rejects_malformed_dates() {
        for raw in ["", "2024-02-30", "01/03/2024", "2024-13-01", "tomorrow"] {
            assert!(
                matches!(parse_billing_date(raw), Err(BillingError::InvalidDate(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn missing_date_is_rejected() {
        let err = require_date(None, "next_payment_date").unwrap_err();
        assert_eq!(
            err,
            BillingError::InvalidDate("next_payment_date is missing".to_string())
        );
    }
}
