pub mod app_users;
pub mod billing_cycles;
pub mod payments;
pub mod subscriptions;
