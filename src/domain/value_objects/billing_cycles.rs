use std::fmt::Display;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    billing::cycle_state::BillingCycleState,
    value_objects::enums::payment_statuses::PaymentStatus,
};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CycleAction {
    /// A payment row was written for the due date.
    Created,
    /// An outstanding payment for the due date moved to `PAID`.
    Settled,
    /// The due date already had a paid payment; only the schedule moved forward.
    Advanced,
    /// The due date already has a payment and nothing changed.
    Unchanged,
    /// The subscription's schedule moved on while this evaluation ran.
    Stale,
}

impl Display for CycleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let action = match self {
            CycleAction::Created => "created",
            CycleAction::Settled => "settled",
            CycleAction::Advanced => "advanced",
            CycleAction::Unchanged => "unchanged",
            CycleAction::Stale => "stale",
        };
        write!(f, "{}", action)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CycleEvaluation {
    pub subscription_id: Uuid,
    pub payment_id: Option<Uuid>,
    pub due_date: NaiveDate,
    pub status: PaymentStatus,
    pub next_payment_date: NaiveDate,
    pub state: BillingCycleState,
    pub action: CycleAction,
}

/// Payment insert plus schedule update applied as one unit by the storage layer.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleWrite {
    pub subscription_id: Uuid,
    /// `next_payment_date` as read before evaluating; the write is dropped if it changed.
    pub expected_next_payment_date: NaiveDate,
    pub due_date: NaiveDate,
    pub amount_minor: i64,
    pub status: PaymentStatus,
    pub next_payment_date: NaiveDate,
}

/// `NOT_PAID -> PAID` transition plus schedule update applied as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementWrite {
    pub payment_id: Uuid,
    pub subscription_id: Uuid,
    pub due_date: NaiveDate,
    pub next_payment_date: NaiveDate,
}

/// Schedule-only update for a due date whose payment is already paid.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleAdvance {
    pub subscription_id: Uuid,
    pub expected_next_payment_date: NaiveDate,
    pub next_payment_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct BillingRunSummary {
    pub evaluated: usize,
    pub paid: usize,
    pub outstanding: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BillingRunSummary {
    pub fn record(&mut self, evaluation: &CycleEvaluation) {
        self.evaluated += 1;
        match (evaluation.action, evaluation.status) {
            (CycleAction::Stale, _) | (CycleAction::Unchanged, PaymentStatus::Paid) => {
                self.skipped += 1
            }
            (_, PaymentStatus::Paid) => self.paid += 1,
            (_, PaymentStatus::NotPaid) => self.outstanding += 1,
        }
    }

    pub fn record_failure(&mut self) {
        self.evaluated += 1;
        self.failed += 1;
    }
}
