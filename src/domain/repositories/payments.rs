use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::payments::PaymentEntity;

#[async_trait]
#[automock]
pub trait PaymentRepository {
    async fn find_by_id(&self, payment_id: Uuid) -> Result<Option<PaymentEntity>>;

    async fn find_by_due_date(
        &self,
        subscription_id: Uuid,
        due_date: NaiveDate,
    ) -> Result<Option<PaymentEntity>>;

    async fn list_by_subscription(&self, subscription_id: Uuid) -> Result<Vec<PaymentEntity>>;
}
