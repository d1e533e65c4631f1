use std::sync::Arc;

use color_eyre::eyre::Result;

use crate::config::Config;
use crate::database::Database;
use crate::ports::mailer::Mailer;
use crate::services::album::AlbumService;
use crate::services::artist::ArtistService;
use crate::services::auth::{AuthService, AuthSettings};
use crate::services::favorite::FavoriteService;
use crate::services::password::PasswordHasher;
use crate::services::playlist::PlaylistService;
use crate::services::premium::{PremiumService, PremiumSettings};
use crate::services::rating::RatingService;
use crate::services::song::SongService;
use crate::services::token::TokenService;
use crate::services::user::UserService;

pub struct AppState {
    pub db: Arc<Database>,
    pub config: Config,
    pub tokens: Arc<TokenService>,
    pub hasher: PasswordHasher,
    pub mailer: Arc<dyn Mailer>,
    pub auth_settings: AuthSettings,
    pub premium_settings: PremiumSettings,
}

impl AppState {
    pub fn new(db: Arc<Database>, config: Config, mailer: Arc<dyn Mailer>) -> Result<Self> {
        let tokens = Arc::new(TokenService::new(
            &config.auth.jwt_secret()?,
            config.auth.token_ttl()?,
        )?);
        let hasher = PasswordHasher::new(config.auth.bcrypt_cost);
        let auth_settings = AuthSettings::from_config(&config)?;
        let premium_settings = PremiumSettings::from_config(&config)?;
        if premium_settings.webhook_secret.is_none() {
            tracing::warn!("No Stripe webhook secret configured, payment webhooks will fail");
        }

        Ok(Self {
            db,
            config,
            tokens,
            hasher,
            mailer,
            auth_settings,
            premium_settings,
        })
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(
            self.db.clone(),
            self.hasher,
            self.tokens.clone(),
            self.mailer.clone(),
            self.auth_settings.clone(),
        )
    }

    pub fn user_service(&self) -> UserService {
        UserService::new(self.db.clone(), self.hasher)
    }

    pub fn artist_service(&self) -> ArtistService {
        ArtistService::new(self.db.clone())
    }

    pub fn album_service(&self) -> AlbumService {
        AlbumService::new(self.db.clone())
    }

    pub fn song_service(&self) -> SongService {
        SongService::new(self.db.clone())
    }

    pub fn playlist_service(&self) -> PlaylistService {
        PlaylistService::new(self.db.clone())
    }

    pub fn favorite_service(&self) -> FavoriteService {
        FavoriteService::new(self.db.clone())
    }

    pub fn rating_service(&self) -> RatingService {
        RatingService::new(self.db.clone())
    }

    pub fn premium_service(&self) -> PremiumService {
        PremiumService::new(self.db.clone(), self.premium_settings.clone())
    }
}
