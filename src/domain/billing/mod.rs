//! Billing cycle engine: payment status derivation and next payment date
//! advancement. Everything in here is pure and free of I/O.

pub mod cycle_state;
pub mod dates;
pub mod engine;
pub mod errors;
