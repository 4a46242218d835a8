use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*, upsert::excluded};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::app_users::InsertAppUserEntity, repositories::app_users::AppUserRepository,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::app_users},
};

pub struct AppUserPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl AppUserPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl AppUserRepository for AppUserPostgres {
    async fn upsert_by_email(&self, insert_app_user_entity: InsertAppUserEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let user_id = insert_into(app_users::table)
            .values(&insert_app_user_entity)
            .on_conflict(app_users::email)
            .do_update()
            .set((
                app_users::name.eq(excluded(app_users::name)),
                app_users::updated_at.eq(Utc::now()),
            ))
            .returning(app_users::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(user_id)
    }
}
