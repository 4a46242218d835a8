use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillingError {
    #[error("invalid billing period: {0}")]
    InvalidBillingPeriod(String),
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("invalid payment status: {0}")]
    InvalidPaymentStatus(String),
    #[error("invalid currency: {0}")]
    InvalidCurrency(String),
    #[error("price must be positive, got {0} minor units")]
    InvalidPrice(i64),
    #[error("payment is already settled")]
    AlreadySettled,
}

pub type BillingResult<T> = std::result::Result<T, BillingError>;
