use chrono::{Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use super::{
    cycle_state::BillingCycleState,
    errors::{BillingError, BillingResult},
};
use crate::domain::value_objects::enums::{
    billing_periods::BillingPeriod, payment_statuses::PaymentStatus,
};

/// Outcome of evaluating one due date of a subscription.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CycleDecision {
    pub status: PaymentStatus,
    pub next_payment_date: NaiveDate,
    pub state: BillingCycleState,
}

pub fn period_to_months(billing_period: BillingPeriod) -> u32 {
    billing_period.months()
}

/// A due date counts from the start of its day; it is paid once that instant
/// lies strictly before `reference_now`.
pub fn derive_payment_status(due_date: NaiveDate, reference_now: NaiveDateTime) -> PaymentStatus {
    if due_date.and_time(NaiveTime::MIN) < reference_now {
        PaymentStatus::Paid
    } else {
        PaymentStatus::NotPaid
    }
}

/// Month addition clamps to the last day of the target month
/// (`2024-01-31` + 1 month = `2024-02-29`).
pub fn advance_next_payment_date(
    due_date: NaiveDate,
    billing_period: BillingPeriod,
    status: PaymentStatus,
) -> BillingResult<NaiveDate> {
    match status {
        PaymentStatus::NotPaid => Ok(due_date),
        PaymentStatus::Paid => due_date
            .checked_add_months(Months::new(period_to_months(billing_period)))
            .ok_or_else(|| {
                BillingError::InvalidDate(format!(
                    "{due_date} cannot be advanced by one {billing_period} period"
                ))
            }),
    }
}

pub fn evaluate_cycle(
    due_date: NaiveDate,
    billing_period: BillingPeriod,
    reference_now: NaiveDateTime,
) -> BillingResult<CycleDecision> {
    let status = derive_payment_status(due_date, reference_now);
    let next_payment_date = advance_next_payment_date(due_date, billing_period, status)?;

    Ok(CycleDecision {
        status,
        next_payment_date,
        state: BillingCycleState::for_status(status),
    })
}

/// Moves an outstanding charge to `PAID` and returns the subscription's new
/// next payment date.
pub fn settle(
    due_date: NaiveDate,
    billing_period: BillingPeriod,
    current_status: PaymentStatus,
) -> BillingResult<CycleDecision> {
    if current_status == PaymentStatus::Paid {
        return Err(BillingError::AlreadySettled);
    }

    let next_payment_date =
        advance_next_payment_date(due_date, billing_period, PaymentStatus::Paid)?;

    Ok(CycleDecision {
        status: PaymentStatus::Paid,
        next_payment_date,
        state: BillingCycleState::Outstanding.settle(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn midnight(y: i32, m: u32, d: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(0, 0, 0).unwrap()
    }

    fn days_of(year: i32) -> impl Iterator<Item = NaiveDate> {
        date(year, 1, 1)
            .iter_days()
            .take_while(move |d| d.year() == year)
    }

    #[test]
    fn period_mapping_is_fixed() {
        assert_eq!(period_to_months(BillingPeriod::Monthly), 1);
        assert_eq!(period_to_months(BillingPeriod::Yearly), 12);
    }

    #[test]
    fn due_date_before_now_is_paid() {
        assert_eq!(
            derive_payment_status(date(2024, 3, 1), midnight(2024, 3, 2)),
            PaymentStatus::Paid
        );
        assert_eq!(
            derive_payment_status(date(2024, 3, 1), date(2024, 3, 1).and_hms_opt(0, 0, 1).unwrap()),
            PaymentStatus::Paid
        );
    }

    #[test]
    fn due_date_equal_to_now_is_not_paid() {
        assert_eq!(
            derive_payment_status(date(2024, 3, 1), midnight(2024, 3, 1)),
            PaymentStatus::NotPaid
        );
    }

    #[test]
    fn due_date_after_now_is_not_paid() {
        assert_eq!(
            derive_payment_status(date(2024, 3, 5), midnight(2024, 3, 1)),
            PaymentStatus::NotPaid
        );
    }

    #[test]
    fn monthly_payment_clamps_to_month_end() {
        assert_eq!(
            advance_next_payment_date(date(2024, 1, 31), BillingPeriod::Monthly, PaymentStatus::Paid)
                .unwrap(),
            date(2024, 2, 29)
        );
        assert_eq!(
            advance_next_payment_date(date(2023, 1, 31), BillingPeriod::Monthly, PaymentStatus::Paid)
                .unwrap(),
            date(2023, 2, 28)
        );
        assert_eq!(
            advance_next_payment_date(date(2024, 12, 15), BillingPeriod::Monthly, PaymentStatus::Paid)
                .unwrap(),
            date(2025, 1, 15)
        );
    }

    #[test]
    fn yearly_payment_adds_twelve_months() {
        assert_eq!(
            advance_next_payment_date(date(2024, 2, 29), BillingPeriod::Yearly, PaymentStatus::Paid)
                .unwrap(),
            date(2025, 2, 28)
        );
        for day in days_of(2023) {
            assert_eq!(
                advance_next_payment_date(day, BillingPeriod::Yearly, PaymentStatus::Paid).unwrap(),
                day.checked_add_months(Months::new(12)).unwrap()
            );
        }
    }

    #[test]
    fn unpaid_due_date_is_left_in_place() {
        for day in days_of(2024) {
            for period in [BillingPeriod::Monthly, BillingPeriod::Yearly] {
                assert_eq!(
                    advance_next_payment_date(day, period, PaymentStatus::NotPaid).unwrap(),
                    day
                );
            }
        }
    }

    #[test]
    fn advanced_date_is_never_earlier() {
        for day in days_of(2024) {
            for period in [BillingPeriod::Monthly, BillingPeriod::Yearly] {
                let next = advance_next_payment_date(day, period, PaymentStatus::Paid).unwrap();
                assert!(next > day, "{day} advanced to {next}");
            }
        }
    }

    #[test]
    fn repeated_paid_cycles_are_monotonic() {
        let mut due = date(2024, 1, 31);
        let mut seen = vec![due];
        for _ in 0..36 {
            let now = due.and_hms_opt(12, 0, 0).unwrap();
            let decision = evaluate_cycle(due, BillingPeriod::Monthly, now).unwrap();
            assert_eq!(decision.status, PaymentStatus::Paid);
            due = decision.next_payment_date;
            seen.push(due);
        }
        assert!(seen.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(seen[1], date(2024, 2, 29));
        assert_eq!(seen[2], date(2024, 3, 29));
    }

    #[test]
    fn evaluates_paid_scenario() {
        let decision =
            evaluate_cycle(date(2024, 3, 1), BillingPeriod::Monthly, midnight(2024, 3, 2)).unwrap();
        assert_eq!(
            decision,
            CycleDecision {
                status: PaymentStatus::Paid,
                next_payment_date: date(2024, 4, 1),
                state: BillingCycleState::Settled,
            }
        );
    }

    #[test]
    fn evaluates_exact_boundary_scenario() {
        let decision =
            evaluate_cycle(date(2024, 3, 1), BillingPeriod::Monthly, midnight(2024, 3, 1)).unwrap();
        assert_eq!(
            decision,
            CycleDecision {
                status: PaymentStatus::NotPaid,
                next_payment_date: date(2024, 3, 1),
                state: BillingCycleState::Outstanding,
            }
        );
    }

    #[test]
    fn settles_outstanding_charge() {
        let decision =
            settle(date(2024, 1, 31), BillingPeriod::Monthly, PaymentStatus::NotPaid).unwrap();
        assert_eq!(decision.status, PaymentStatus::Paid);
        assert_eq!(decision.next_payment_date, date(2024, 2, 29));
        assert_eq!(decision.state, BillingCycleState::Settled);
    }

    #[test]
    fn settling_paid_charge_fails() {
        assert_eq!(
            settle(date(2024, 1, 31), BillingPeriod::Yearly, PaymentStatus::Paid),
            Err(BillingError::AlreadySettled)
        );
    }

    #[test]
    fn overflowing_date_is_rejected() {
        assert!(matches!(
            advance_next_payment_date(NaiveDate::MAX, BillingPeriod::Yearly, PaymentStatus::Paid),
            Err(BillingError::InvalidDate(_))
        ));
    }
}
