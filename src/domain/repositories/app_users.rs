use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::app_users::InsertAppUserEntity;

#[async_trait]
#[automock]
pub trait AppUserRepository {
    async fn upsert_by_email(&self, insert_app_user_entity: InsertAppUserEntity) -> Result<Uuid>;
}
