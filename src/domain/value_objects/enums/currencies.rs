use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::domain::billing::errors::BillingError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SubscriptionCurrency {
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "GBP")]
    Gbp,
    #[serde(rename = "PLN")]
    Pln,
    #[serde(rename = "USD")]
    Usd,
}

impl SubscriptionCurrency {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionCurrency::Eur => "EUR",
            SubscriptionCurrency::Gbp => "GBP",
            SubscriptionCurrency::Pln => "PLN",
            SubscriptionCurrency::Usd => "USD",
        }
    }
}

impl TryFrom<&str> for SubscriptionCurrency {
    type Error = BillingError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "EUR" => Ok(SubscriptionCurrency::Eur),
            "GBP" => Ok(SubscriptionCurrency::Gbp),
            "PLN" => Ok(SubscriptionCurrency::Pln),
            "USD" => Ok(SubscriptionCurrency::Usd),
            _ => Err(BillingError::InvalidCurrency(value.to_string())),
        }
    }
}

impl Display for SubscriptionCurrency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
