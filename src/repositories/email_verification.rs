use std::sync::Arc;

use chrono::{DateTime, Utc};
use color_eyre::eyre::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::database::Database;
use crate::entities::email_verification;

#[derive(Clone)]
pub struct EmailVerificationRepository {
    db: Arc<Database>,
}

impl EmailVerificationRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn add(
        &self,
        user_id: i64,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> Result<email_verification::Model> {
        email_verification::ActiveModel {
            user_id: Set(user_id),
            token: Set(token),
            expires_at: Set(expires_at),
            verified_at: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db.conn)
        .await
        .wrap_err("Failed to insert email verification")
    }

    pub async fn update(
        &self,
        model: email_verification::ActiveModel,
    ) -> Result<email_verification::Model> {
        model
            .update(&self.db.conn)
            .await
            .wrap_err("Failed to update email verification")
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = email_verification::Entity::delete_by_id(id)
            .exec(&self.db.conn)
            .await
            .wrap_err("Failed to delete email verification")?;
        Ok(result.rows_affected > 0)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<email_verification::Model>> {
        email_verification::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to get email verification")
    }

    pub async fn get_all(&self) -> Result<Vec<email_verification::Model>> {
        email_verification::Entity::find()
            .order_by_asc(email_verification::Column::Id)
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to get email verifications")
    }

    pub async fn find_by_user(&self, user_id: i64) -> Result<Option<email_verification::Model>> {
        email_verification::Entity::find()
            .filter(email_verification::Column::UserId.eq(user_id))
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to query email verification by user")
    }

    pub async fn find_by_token(&self, token: &str) -> Result<Option<email_verification::Model>> {
        email_verification::Entity::find()
            .filter(email_verification::Column::Token.eq(token))
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to query email verification by token")
    }
}
