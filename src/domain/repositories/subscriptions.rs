use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::subscriptions::{InsertSubscriptionEntity, SubscriptionEntity};

#[async_trait]
#[automock]
pub trait SubscriptionRepository {
    async fn create_subscription(
        &self,
        insert_subscription_entity: InsertSubscriptionEntity,
    ) -> Result<Uuid>;

    async fn find_by_id(&self, subscription_id: Uuid) -> Result<Option<SubscriptionEntity>>;

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<SubscriptionEntity>>;

    /// Subscriptions whose `next_payment_date` is on or before `due_on`,
    /// oldest due date first.
    async fn list_due_subscriptions(
        &self,
        due_on: NaiveDate,
        limit: i64,
    ) -> Result<Vec<SubscriptionEntity>>;
}
