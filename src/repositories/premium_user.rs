use std::sync::Arc;

use chrono::{DateTime, Utc};
use color_eyre::eyre::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::database::Database;
use crate::entities::premium_user;

pub struct NewPremiumUser {
    pub user_id: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub amount_paid: i64,
    pub currency: String,
    pub payment_reference: Option<String>,
}

#[derive(Clone)]
pub struct PremiumUserRepository {
    db: Arc<Database>,
}

impl PremiumUserRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn add(&self, new_premium: NewPremiumUser) -> Result<premium_user::Model> {
        premium_user::ActiveModel {
            user_id: Set(new_premium.user_id),
            start_date: Set(new_premium.start_date),
            end_date: Set(new_premium.end_date),
            amount_paid: Set(new_premium.amount_paid),
            currency: Set(new_premium.currency),
            last_payment_reference: Set(new_premium.payment_reference),
            ..Default::default()
        }
        .insert(&self.db.conn)
        .await
        .wrap_err("Failed to insert premium subscription")
    }

    pub async fn update(&self, model: premium_user::ActiveModel) -> Result<premium_user::Model> {
        model
            .update(&self.db.conn)
            .await
            .wrap_err("Failed to update premium subscription")
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = premium_user::Entity::delete_by_id(id)
            .exec(&self.db.conn)
            .await
            .wrap_err("Failed to delete premium subscription")?;
        Ok(result.rows_affected > 0)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<premium_user::Model>> {
        premium_user::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to get premium subscription")
    }

    pub async fn get_all(&self) -> Result<Vec<premium_user::Model>> {
        premium_user::Entity::find()
            .order_by_asc(premium_user::Column::Id)
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to get premium subscriptions")
    }

    pub async fn find_by_user(&self, user_id: i64) -> Result<Option<premium_user::Model>> {
        premium_user::Entity::find()
            .filter(premium_user::Column::UserId.eq(user_id))
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to query premium subscription by user")
    }
}
