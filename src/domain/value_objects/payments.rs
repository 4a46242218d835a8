use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::payments::PaymentEntity, value_objects::enums::payment_statuses::PaymentStatus,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentModel {
    pub id: Uuid,
    pub subscription_id: Uuid,
    pub amount_minor: i64,
    pub due_date: NaiveDate,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentEntity> for PaymentModel {
    type Error = anyhow::Error;

    fn try_from(value: PaymentEntity) -> anyhow::Result<Self> {
        let status = PaymentStatus::try_from(value.status.as_str())
            .with_context(|| format!("payment {} has an invalid status", value.id))?;

        Ok(Self {
            id: value.id,
            subscription_id: value.subscription_id,
            amount_minor: value.amount_minor,
            due_date: value.due_date,
            status,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}
