use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::domain::billing::errors::BillingError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Paid,
    NotPaid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "PAID",
            PaymentStatus::NotPaid => "NOT_PAID",
        }
    }
}

impl TryFrom<&str> for PaymentStatus {
    type Error = BillingError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PAID" => Ok(PaymentStatus::Paid),
            "NOT_PAID" => Ok(PaymentStatus::NotPaid),
            _ => Err(BillingError::InvalidPaymentStatus(value.to_string())),
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stored_statuses() {
        assert_eq!(PaymentStatus::try_from("PAID").unwrap(), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::try_from("not_paid").unwrap(), PaymentStatus::NotPaid);
    }

    #[test]
    fn rejects_unknown_status() {
        let err = PaymentStatus::try_from("REFUNDED").unwrap_err();
        assert_eq!(err, BillingError::InvalidPaymentStatus("REFUNDED".to_string()));
    }

    #[test]
    fn display_matches_stored_value() {
        for status in [PaymentStatus::Paid, PaymentStatus::NotPaid] {
            assert_eq!(PaymentStatus::try_from(status.to_string().as_str()).unwrap(), status);
        }
    }
}
