use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;

/// Where a subscription sits in its repeating billing cycle.
///
/// `AwaitingDue -> Evaluating -> Settled | Outstanding`, `Outstanding -> Settled`
/// once the charge is paid, and `Settled -> AwaitingDue` for the next period.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycleState {
    AwaitingDue,
    Evaluating,
    Settled,
    Outstanding,
}

impl BillingCycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycleState::AwaitingDue => "awaiting_due",
            BillingCycleState::Evaluating => "evaluating",
            BillingCycleState::Settled => "settled",
            BillingCycleState::Outstanding => "outstanding",
        }
    }

    pub fn begin_evaluation(self) -> Self {
        match self {
            BillingCycleState::AwaitingDue | BillingCycleState::Outstanding => {
                BillingCycleState::Evaluating
            }
            other => other,
        }
    }

    pub fn after_evaluation(self, status: PaymentStatus) -> Self {
        match (self, status) {
            (BillingCycleState::Evaluating, PaymentStatus::Paid) => BillingCycleState::Settled,
            (BillingCycleState::Evaluating, PaymentStatus::NotPaid) => {
                BillingCycleState::Outstanding
            }
            (other, _) => other,
        }
    }

    pub fn settle(self) -> Self {
        match self {
            BillingCycleState::Outstanding => BillingCycleState::Settled,
            other => other,
        }
    }

    pub fn next_period(self) -> Self {
        match self {
            BillingCycleState::Settled => BillingCycleState::AwaitingDue,
            other => other,
        }
    }

    pub fn for_status(status: PaymentStatus) -> Self {
        BillingCycleState::AwaitingDue
            .begin_evaluation()
            .after_evaluation(status)
    }
}

impl Display for BillingCycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paid_cycle_settles_and_loops_back() {
        let state = BillingCycleState::for_status(PaymentStatus::Paid);
        assert_eq!(state, BillingCycleState::Settled);
        assert_eq!(state.next_period(), BillingCycleState::AwaitingDue);
    }

    #[test]
    fn unpaid_cycle_stays_outstanding_until_settled() {
        let state = BillingCycleState::for_status(PaymentStatus::NotPaid);
        assert_eq!(state, BillingCycleState::Outstanding);
        assert_eq!(state.next_period(), BillingCycleState::Outstanding);
        assert_eq!(state.settle().next_period(), BillingCycleState::AwaitingDue);
    }

    #[test]
    fn outstanding_cycle_can_be_re_evaluated() {
        let state = BillingCycleState::Outstanding
            .begin_evaluation()
            .after_evaluation(PaymentStatus::Paid);
        assert_eq!(state, BillingCycleState::Settled);
    }

    #[test]
    fn settle_is_a_no_op_outside_outstanding() {
        assert_eq!(
            BillingCycleState::AwaitingDue.settle(),
            BillingCycleState::AwaitingDue
        );
        assert_eq!(BillingCycleState::Settled.settle(), BillingCycleState::Settled);
    }
}
