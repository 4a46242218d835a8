pub mod billing_cycles;
pub mod enums;
pub mod payments;
pub mod subscriptions;
