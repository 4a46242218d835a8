pub mod billing_periods;
pub mod currencies;
pub mod payment_statuses;
