use std::sync::Arc;

use chrono::{DateTime, Utc};
use color_eyre::eyre::{Context, Result};
use sea_orm::{IntoActiveModel, Set};
use url::Url;

use crate::config::Config;
use crate::database::Database;
use crate::entities::{email_verification, user};
use crate::entities::user::UserRole;
use crate::error::{AppError, AppResult, Resource};
use crate::ports::mailer::Mailer;
use crate::repositories::user::NewUser;
use crate::repositories::{EmailVerificationRepository, UserRepository};
use crate::services::password::PasswordHasher;
use crate::services::token::{IssuedToken, TokenService};
use crate::services::{unique_violation_as_conflict, validation};

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub verification_ttl: chrono::Duration,
    pub require_verified_email: bool,
    /// Base for links sent in verification mail.
    pub base_url: Url,
}

impl AuthSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        let verification_ttl = chrono::Duration::from_std(config.auth.verification_ttl()?)
            .wrap_err("auth.verification_ttl is out of range")?;
        let base_url = Url::parse(&config.server.base_url)
            .wrap_err(format!("Invalid server.base_url: {}", config.server.base_url))?;
        Ok(Self {
            verification_ttl,
            require_verified_email: config.auth.require_verified_email,
            base_url,
        })
    }
}

pub struct LoginResult {
    pub token: IssuedToken,
    pub user: user::Model,
}

pub struct AuthService {
    users: UserRepository,
    verifications: EmailVerificationRepository,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
    mailer: Arc<dyn Mailer>,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(
        db: Arc<Database>,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
        mailer: Arc<dyn Mailer>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            verifications: EmailVerificationRepository::new(db),
            hasher,
            tokens,
            mailer,
            settings,
        }
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> AppResult<user::Model> {
        let user = self
            .create_account(username, email, password, UserRole::User)
            .await?;

        let verification = self.issue_verification(user.id, Utc::now()).await?;
        // The account exists either way; the user can ask for a new mail.
        if let Err(e) = self.send_verification(&user, &verification.token).await {
            tracing::warn!(user_id = user.id, "Failed to send verification email: {e:?}");
        }

        tracing::info!(user_id = user.id, "Registered user {}", user.username);
        Ok(user)
    }

    /// Create a verified administrator without sending mail.
    #[tracing::instrument(skip(self, password))]
    pub async fn create_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> AppResult<user::Model> {
        let user = self
            .create_account(username, email, password, UserRole::Admin)
            .await?;
        let mut active = user.into_active_model();
        active.email_verified = Set(true);
        Ok(self.users.update(active).await?)
    }

    async fn create_account(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> AppResult<user::Model> {
        let username = validation::username(username)?;
        let email = validation::email(email)?;
        validation::password(password)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("Email is already registered"));
        }
        if self.users.find_by_username(&username).await?.is_some() {
            return Err(AppError::conflict("Username is already taken"));
        }

        let password_hash = self.hasher.hash(password).await?;
        self.users
            .add(NewUser {
                username,
                email,
                password_hash,
                role,
            })
            .await
            .map_err(unique_violation_as_conflict("Username or email is already in use"))
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginResult> {
        let invalid = || AppError::unauthorized("Invalid credentials");

        let email = email.trim().to_lowercase();
        let Some(user) = self.users.find_by_email(&email).await? else {
            return Err(invalid());
        };
        if !self.hasher.verify(password, &user.password_hash).await? {
            return Err(invalid());
        }
        if self.settings.require_verified_email && !user.email_verified {
            return Err(AppError::forbidden("Email address has not been verified"));
        }

        let token = self.tokens.issue(&user)?;
        tracing::debug!(user_id = user.id, "User logged in");
        Ok(LoginResult { token, user })
    }

    pub async fn verify_email(&self, token: &str) -> AppResult<user::Model> {
        self.verify_email_at(token, Utc::now()).await
    }

    pub async fn verify_email_at(&self, token: &str, now: DateTime<Utc>) -> AppResult<user::Model> {
        let verification = self
            .verifications
            .find_by_token(token.trim())
            .await?
            .ok_or(AppError::NotFound(Resource::EmailVerification))?;

        if verification.verified_at.is_some() {
            return Err(AppError::conflict("Email address is already verified"));
        }
        if verification.is_expired(now) {
            return Err(AppError::validation("Verification token has expired"));
        }

        let user = self
            .users
            .get_by_id(verification.user_id)
            .await?
            .ok_or(AppError::NotFound(Resource::User))?;

        let mut active = verification.into_active_model();
        active.verified_at = Set(Some(now));
        self.verifications.update(active).await?;

        let mut active = user.into_active_model();
        active.email_verified = Set(true);
        let user = self.users.update(active).await?;

        tracing::info!(user_id = user.id, "Email verified");
        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    pub async fn resend_verification(&self, email: &str) -> AppResult<()> {
        let email = email.trim().to_lowercase();
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AppError::NotFound(Resource::User))?;

        if user.email_verified {
            return Err(AppError::conflict("Email address is already verified"));
        }

        let verification = self.issue_verification(user.id, Utc::now()).await?;
        self.send_verification(&user, &verification.token).await?;
        Ok(())
    }

    /// Create or rotate the user's verification token.
    async fn issue_verification(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<email_verification::Model> {
        let token = uuid::Uuid::new_v4().to_string();
        let expires_at = now + self.settings.verification_ttl;

        match self.verifications.find_by_user(user_id).await? {
            Some(existing) => {
                let mut active = existing.into_active_model();
                active.token = Set(token);
                active.expires_at = Set(expires_at);
                active.verified_at = Set(None);
                active.created_at = Set(now);
                self.verifications.update(active).await
            }
            None => self.verifications.add(user_id, token, expires_at).await,
        }
    }

    async fn send_verification(&self, user: &user::Model, token: &str) -> Result<()> {
        let mut link = self
            .settings
            .base_url
            .join("api/auth/verify-email")
            .wrap_err("Failed to build verification link")?;
        link.query_pairs_mut().append_pair("token", token);

        self.mailer
            .send_verification(&user.email, &user.username, link.as_str())
            .await
    }
}
