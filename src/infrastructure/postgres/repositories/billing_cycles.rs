use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::payments::InsertPaymentEntity,
        repositories::billing_cycles::BillingCycleRepository,
        value_objects::{
            billing_cycles::{CycleWrite, ScheduleAdvance, SettlementWrite},
            enums::payment_statuses::PaymentStatus,
        },
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{payments, subscriptions},
    },
};

pub struct BillingCyclePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl BillingCyclePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn lock_next_payment_date(
    conn: &mut PgConnection,
    subscription_id: Uuid,
) -> QueryResult<Option<NaiveDate>> {
    subscriptions::table
        .filter(subscriptions::id.eq(subscription_id))
        .select(subscriptions::next_payment_date)
        .for_update()
        .first::<NaiveDate>(conn)
        .optional()
}

fn write_next_payment_date(
    conn: &mut PgConnection,
    subscription_id: Uuid,
    next_payment_date: NaiveDate,
) -> QueryResult<usize> {
    update(subscriptions::table)
        .filter(subscriptions::id.eq(subscription_id))
        .set((
            subscriptions::next_payment_date.eq(next_payment_date),
            subscriptions::updated_at.eq(Utc::now()),
        ))
        .execute(conn)
}

#[async_trait]
impl BillingCycleRepository for BillingCyclePostgres {
    async fn record_cycle(&self, cycle_write: CycleWrite) -> Result<Option<Uuid>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payment_id = conn.transaction::<_, anyhow::Error, _>(|conn| {
            let current_due = lock_next_payment_date(conn, cycle_write.subscription_id)?;
            if current_due != Some(cycle_write.expected_next_payment_date) {
                return Ok(None);
            }

            // Unique on (subscription_id, due_date); a concurrent evaluation already wrote it.
            let payment_id = insert_into(payments::table)
                .values(&InsertPaymentEntity {
                    subscription_id: cycle_write.subscription_id,
                    amount_minor: cycle_write.amount_minor,
                    due_date: cycle_write.due_date,
                    status: cycle_write.status.to_string(),
                })
                .on_conflict((payments::subscription_id, payments::due_date))
                .do_nothing()
                .returning(payments::id)
                .get_result::<Uuid>(conn)
                .optional()?;
            let Some(payment_id) = payment_id else {
                return Ok(None);
            };

            if cycle_write.next_payment_date > cycle_write.expected_next_payment_date {
                write_next_payment_date(
                    conn,
                    cycle_write.subscription_id,
                    cycle_write.next_payment_date,
                )?;
            }

            Ok(Some(payment_id))
        })?;

        Ok(payment_id)
    }

    async fn settle_cycle(&self, settlement_write: SettlementWrite) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let settled = conn.transaction::<_, anyhow::Error, _>(|conn| {
            // Subscription row first, same lock order as record_cycle.
            let current_due = lock_next_payment_date(conn, settlement_write.subscription_id)?;

            let status = payments::table
                .filter(payments::id.eq(settlement_write.payment_id))
                .select(payments::status)
                .for_update()
                .first::<String>(conn)
                .optional()?;
            if status.as_deref() != Some(PaymentStatus::NotPaid.as_str()) {
                return Ok(false);
            }

            update(payments::table)
                .filter(payments::id.eq(settlement_write.payment_id))
                .set((
                    payments::status.eq(PaymentStatus::Paid.to_string()),
                    payments::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;

            // An older charge can be paid after the schedule already moved past it.
            if current_due == Some(settlement_write.due_date)
                && settlement_write.next_payment_date > settlement_write.due_date
            {
                write_next_payment_date(
                    conn,
                    settlement_write.subscription_id,
                    settlement_write.next_payment_date,
                )?;
            }

            Ok(true)
        })?;

        Ok(settled)
    }

    async fn advance_schedule(&self, schedule_advance: ScheduleAdvance) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let advanced = conn.transaction::<_, anyhow::Error, _>(|conn| {
            let current_due = lock_next_payment_date(conn, schedule_advance.subscription_id)?;
            if current_due != Some(schedule_advance.expected_next_payment_date)
                || schedule_advance.next_payment_date <= schedule_advance.expected_next_payment_date
            {
                return Ok(false);
            }

            write_next_payment_date(
                conn,
                schedule_advance.subscription_id,
                schedule_advance.next_payment_date,
            )?;

            Ok(true)
        })?;

        Ok(advanced)
    }
}
