pub mod billing_cycle;
pub mod seed;
