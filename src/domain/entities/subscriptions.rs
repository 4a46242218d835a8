use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::subscriptions;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = subscriptions)]
pub struct SubscriptionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub category: String,
    pub avatar_url: Option<String>,
    pub price_minor: i64,
    pub currency: String,
    pub billing_period: String,
    pub start_date: NaiveDate,
    pub next_payment_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = subscriptions)]
pub struct InsertSubscriptionEntity {
    pub user_id: Uuid,
    pub name: String,
    pub category: String,
    pub avatar_url: Option<String>,
    pub price_minor: i64,
    pub currency: String,
    pub billing_period: String,
    pub start_date: NaiveDate,
    pub next_payment_date: NaiveDate,
}
