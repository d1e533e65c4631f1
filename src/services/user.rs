use std::sync::Arc;

use sea_orm::{IntoActiveModel, Set};

use crate::database::Database;
use crate::entities::user::{self, UserRole};
use crate::error::{AppError, AppResult, Resource};
use crate::repositories::{PaginatedResult, Pagination, UserRepository};
use crate::services::password::PasswordHasher;
use crate::services::{unique_violation_as_conflict, validation};

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
}

pub struct UserService {
    users: UserRepository,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(db: Arc<Database>, hasher: PasswordHasher) -> Self {
        Self {
            users: UserRepository::new(db),
            hasher,
        }
    }

    pub async fn get(&self, id: i64) -> AppResult<user::Model> {
        self.users
            .get_by_id(id)
            .await?
            .ok_or(AppError::NotFound(Resource::User))
    }

    pub async fn list(&self, pagination: Pagination) -> AppResult<PaginatedResult<user::Model>> {
        Ok(self.users.get_all(pagination).await?)
    }

    /// Changing the email address clears the verified flag.
    #[tracing::instrument(skip(self))]
    pub async fn update_profile(&self, id: i64, update: ProfileUpdate) -> AppResult<user::Model> {
        let user = self.get(id).await?;
        let mut active = user.clone().into_active_model();

        if let Some(username) = update.username.as_deref() {
            let username = validation::username(username)?;
            if username != user.username {
                if self.users.find_by_username(&username).await?.is_some() {
                    return Err(AppError::conflict("Username is already taken"));
                }
                active.username = Set(username);
            }
        }

        if let Some(email) = update.email.as_deref() {
            let email = validation::email(email)?;
            if email != user.email {
                if self.users.find_by_email(&email).await?.is_some() {
                    return Err(AppError::conflict("Email is already registered"));
                }
                active.email = Set(email);
                active.email_verified = Set(false);
            }
        }

        self.users
            .update(active)
            .await
            .map_err(unique_violation_as_conflict("Username or email is already in use"))
    }

    #[tracing::instrument(skip(self, current_password, new_password))]
    pub async fn change_password(
        &self,
        id: i64,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self.get(id).await?;
        if !self.hasher.verify(current_password, &user.password_hash).await? {
            return Err(AppError::unauthorized("Current password is incorrect"));
        }
        validation::password(new_password)?;

        let password_hash = self.hasher.hash(new_password).await?;
        let mut active = user.into_active_model();
        active.password_hash = Set(password_hash);
        self.users.update(active).await?;

        tracing::info!(user_id = id, "Password changed");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.users.delete(id).await? {
            return Err(AppError::NotFound(Resource::User));
        }
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_role(&self, id: i64, role: UserRole) -> AppResult<user::Model> {
        let user = self.get(id).await?;
        if user.role == role {
            return Ok(user);
        }
        let mut active = user.into_active_model();
        active.role = Set(role);
        Ok(self.users.update(active).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{playlist, rating};
    use crate::test_utils::{
        insert_artist, insert_playlist, insert_song, insert_user, test_db,
    };
    use sea_orm::EntityTrait;

    fn service(db: Arc<Database>) -> UserService {
        UserService::new(db, PasswordHasher::new(4))
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let db = test_db().await;
        assert!(matches!(
            service(db).get(99).await,
            Err(AppError::NotFound(Resource::User))
        ));
    }

    #[tokio::test]
    async fn test_update_profile() {
        let db = test_db().await;
        let user = insert_user(&db, "mara").await;
        insert_user(&db, "taken").await;
        let service = service(db);

        let updated = service
            .update_profile(
                user.id,
                ProfileUpdate {
                    username: Some("mara_k".to_string()),
                    email: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.username, "mara_k");
        assert!(updated.email_verified);

        let updated = service
            .update_profile(
                user.id,
                ProfileUpdate {
                    username: None,
                    email: Some("New@Example.com".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.email, "new@example.com");
        assert!(!updated.email_verified);

        assert!(matches!(
            service
                .update_profile(
                    user.id,
                    ProfileUpdate {
                        username: Some("taken".to_string()),
                        email: None,
                    },
                )
                .await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            service
                .update_profile(
                    user.id,
                    ProfileUpdate {
                        username: None,
                        email: Some("taken@example.com".to_string()),
                    },
                )
                .await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_change_password() {
        let db = test_db().await;
        let user = insert_user(&db, "mara").await;
        let hasher = PasswordHasher::new(4);
        let mut active = user.clone().into_active_model();
        active.password_hash = Set(hasher.hash("old-password").await.unwrap());
        UserRepository::new(db.clone()).update(active).await.unwrap();
        let service = service(db);

        assert!(matches!(
            service
                .change_password(user.id, "not-the-password", "new-password")
                .await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            service.change_password(user.id, "old-password", "short").await,
            Err(AppError::Validation(_))
        ));

        service
            .change_password(user.id, "old-password", "new-password")
            .await
            .unwrap();
        let stored = service.get(user.id).await.unwrap();
        assert!(hasher.verify("new-password", &stored.password_hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_cascades_to_owned_rows() {
        let db = test_db().await;
        let user = insert_user(&db, "mara").await;
        let artist = insert_artist(&db, "Air").await;
        let song = insert_song(&db, artist.id, None, "La Femme d'Argent", "electronic").await;
        insert_playlist(&db, user.id, "Chill", false).await;
        crate::repositories::RatingRepository::new(db.clone())
            .add(user.id, song.id, 5)
            .await
            .unwrap();
        let service = service(db.clone());

        service.delete(user.id).await.unwrap();

        assert!(playlist::Entity::find().all(&db.conn).await.unwrap().is_empty());
        assert!(rating::Entity::find().all(&db.conn).await.unwrap().is_empty());
        assert!(matches!(
            service.delete(user.id).await,
            Err(AppError::NotFound(Resource::User))
        ));
    }

    #[tokio::test]
    async fn test_set_role() {
        let db = test_db().await;
        let user = insert_user(&db, "mara").await;
        let service = service(db);

        let admin = service.set_role(user.id, UserRole::Admin).await.unwrap();
        assert_eq!(admin.role, UserRole::Admin);

        let page = service.list(Pagination::default()).await.unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].role, UserRole::Admin);
    }
}
