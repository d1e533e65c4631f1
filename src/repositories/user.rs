use std::sync::Arc;

use color_eyre::eyre::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::database::Database;
use crate::entities::user::{self, UserRole};
use crate::repositories::query::{PaginatedResult, Pagination, fetch_page};

pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

#[derive(Clone)]
pub struct UserRepository {
    db: Arc<Database>,
}

impl UserRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn add(&self, new_user: NewUser) -> Result<user::Model> {
        user::ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            role: Set(new_user.role),
            ..Default::default()
        }
        .insert(&self.db.conn)
        .await
        .wrap_err("Failed to insert user")
    }

    pub async fn update(&self, model: user::ActiveModel) -> Result<user::Model> {
        model
            .update(&self.db.conn)
            .await
            .wrap_err("Failed to update user")
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = user::Entity::delete_by_id(id)
            .exec(&self.db.conn)
            .await
            .wrap_err("Failed to delete user")?;
        Ok(result.rows_affected > 0)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<user::Model>> {
        user::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to get user")
    }

    pub async fn get_all(&self, pagination: Pagination) -> Result<PaginatedResult<user::Model>> {
        let query = user::Entity::find().order_by_asc(user::Column::Id);
        fetch_page(&self.db.conn, query, pagination).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>> {
        user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to query user by email")
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<user::Model>> {
        user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to query user by username")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_db;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "hash".to_string(),
            role: UserRole::User,
        }
    }

    #[tokio::test]
    async fn test_add_and_lookup() {
        let repo = UserRepository::new(test_db().await);
        let created = repo.add(new_user("mara")).await.unwrap();

        assert_eq!(created.role, UserRole::User);
        assert!(!created.email_verified);

        let by_email = repo.find_by_email("mara@example.com").await.unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(created.id));

        let by_name = repo.find_by_username("mara").await.unwrap();
        assert_eq!(by_name.map(|u| u.id), Some(created.id));

        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let repo = UserRepository::new(test_db().await);
        repo.add(new_user("mara")).await.unwrap();

        let mut duplicate = new_user("mara2");
        duplicate.email = "mara@example.com".to_string();
        let err = repo.add(duplicate).await.unwrap_err();
        assert!(crate::repositories::is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = UserRepository::new(test_db().await);
        let created = repo.add(new_user("mara")).await.unwrap();

        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }
}
