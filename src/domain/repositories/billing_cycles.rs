use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::value_objects::billing_cycles::{CycleWrite, ScheduleAdvance, SettlementWrite};

/// Atomic writes for billing cycle evaluation.
///
/// Implementations lock the subscription row for the duration of the write and
/// never move `next_payment_date` backwards.
/// `record_cycle` applies nothing and returns `None` when `next_payment_date`
/// no longer matches `expected_next_payment_date` or a payment for the due
/// date already exists. `settle_cycle` returns `false` when the payment is not
/// outstanding, and only moves the schedule when it still points at the
/// settled due date. `advance_schedule` returns `false` when the schedule no
/// longer matches `expected_next_payment_date`.
#[async_trait]
#[automock]
pub trait BillingCycleRepository {
    async fn record_cycle(&self, cycle_write: CycleWrite) -> Result<Option<Uuid>>;

    async fn settle_cycle(&self, settlement_write: SettlementWrite) -> Result<bool>;

    async fn advance_schedule(&self, schedule_advance: ScheduleAdvance) -> Result<bool>;
}
