use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    billing::errors::{BillingError, BillingResult},
    entities::subscriptions::SubscriptionEntity,
    value_objects::enums::{billing_periods::BillingPeriod, currencies::SubscriptionCurrency},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub category: String,
    pub avatar_url: Option<String>,
    pub price_minor: i64,
    pub currency: SubscriptionCurrency,
    pub billing_period: BillingPeriod,
    pub start_date: NaiveDate,
    pub next_payment_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionEntity> for SubscriptionModel {
    type Error = BillingError;

    fn try_from(value: SubscriptionEntity) -> BillingResult<Self> {
        Ok(Self {
            id: value.id,
            user_id: value.user_id,
            billing_period: BillingPeriod::try_from(value.billing_period.as_str())?,
            currency: SubscriptionCurrency::try_from(value.currency.as_str())?,
            price_minor: positive_price(value.price_minor)?,
            name: value.name,
            category: value.category,
            avatar_url: value.avatar_url,
            start_date: value.start_date,
            next_payment_date: value.next_payment_date,
            created_at: value.created_at,
        })
    }
}

/// Raw subscription input as submitted by a client; dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsertSubscriptionModel {
    pub name: String,
    pub category: String,
    pub avatar_url: Option<String>,
    pub price_minor: i64,
    pub currency: String,
    pub billing_period: String,
    pub start_date: Option<String>,
    pub next_payment_date: Option<String>,
}

pub fn positive_price(price_minor: i64) -> BillingResult<i64> {
    if price_minor > 0 {
        Ok(price_minor)
    } else {
        Err(BillingError::InvalidPrice(price_minor))
    }
}
