use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::domain::billing::errors::BillingError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingPeriod {
    Monthly,
    Yearly,
}

impl BillingPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingPeriod::Monthly => "MONTHLY",
            BillingPeriod::Yearly => "YEARLY",
        }
    }

    /// Calendar months covered by one billing cycle.
    ///
    /// Every period must be listed here explicitly; there is no fallback arm.
    pub fn months(&self) -> u32 {
        match self {
            BillingPeriod::Monthly => 1,
            BillingPeriod::Yearly => 12,
        }
    }
}

impl TryFrom<&str> for BillingPeriod {
    type Error = BillingError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "MONTHLY" => Ok(BillingPeriod::Monthly),
            "YEARLY" => Ok(BillingPeriod::Yearly),
            _ => Err(BillingError::InvalidBillingPeriod(value.to_string())),
        }
    }
}

impl Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_periods_case_insensitively() {
        assert_eq!(BillingPeriod::try_from("MONTHLY").unwrap(), BillingPeriod::Monthly);
        assert_eq!(BillingPeriod::try_from("yearly").unwrap(), BillingPeriod::Yearly);
        assert_eq!(BillingPeriod::try_from(" Monthly ").unwrap(), BillingPeriod::Monthly);
    }

    #[test]
    fn rejects_unknown_period() {
        let err = BillingPeriod::try_from("WEEKLY").unwrap_err();
        assert_eq!(err, BillingError::InvalidBillingPeriod("WEEKLY".to_string()));
    }

    #[test]
    fn display_matches_stored_value() {
        for period in [BillingPeriod::Monthly, BillingPeriod::Yearly] {
            assert_eq!(BillingPeriod::try_from(period.to_string().as_str()).unwrap(), period);
        }
    }
}
