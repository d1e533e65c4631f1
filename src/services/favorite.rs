use std::sync::Arc;

use serde::Deserialize;

use crate::database::Database;
use crate::entities::favorite::{self, FavoriteTarget};
use crate::error::{AppError, AppResult, Resource};
use crate::repositories::{FavoriteRepository, SongRepository};
use crate::services::playlist::PlaylistService;
use crate::services::unique_violation_as_conflict;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteKind {
    Song,
    Playlist,
}

impl FavoriteKind {
    fn matches(self, target: FavoriteTarget) -> bool {
        matches!(
            (self, target),
            (FavoriteKind::Song, FavoriteTarget::Song(_))
                | (FavoriteKind::Playlist, FavoriteTarget::Playlist(_))
        )
    }
}

pub struct FavoriteService {
    favorites: FavoriteRepository,
    songs: SongRepository,
    playlists: PlaylistService,
}

impl FavoriteService {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            favorites: FavoriteRepository::new(db.clone()),
            songs: SongRepository::new(db.clone()),
            playlists: PlaylistService::new(db),
        }
    }

    async fn ensure_target(&self, user_id: i64, target: FavoriteTarget) -> AppResult<()> {
        match target {
            FavoriteTarget::Song(song_id) => {
                if self.songs.get_by_id(song_id).await?.is_none() {
                    return Err(AppError::NotFound(Resource::Song));
                }
            }
            FavoriteTarget::Playlist(playlist_id) => {
                self.playlists.visible(playlist_id, user_id).await?;
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn add(&self, user_id: i64, target: FavoriteTarget) -> AppResult<favorite::Model> {
        self.ensure_target(user_id, target).await?;
        if self.favorites.find_by_target(user_id, target).await?.is_some() {
            return Err(AppError::conflict("Already in favorites"));
        }

        self.favorites
            .add(user_id, target)
            .await
            .map_err(unique_violation_as_conflict("Already in favorites"))
    }

    /// Favorites of other users read as missing.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, user_id: i64, favorite_id: i64) -> AppResult<()> {
        match self.favorites.get_by_id(favorite_id).await? {
            Some(favorite) if favorite.user_id == user_id => {
                self.favorites.delete(favorite_id).await?;
                Ok(())
            }
            _ => Err(AppError::NotFound(Resource::Favorite)),
        }
    }

    /// Add the target if absent, remove it if present. Returns whether it is now a favorite.
    #[tracing::instrument(skip(self))]
    pub async fn toggle(&self, user_id: i64, target: FavoriteTarget) -> AppResult<bool> {
        if let Some(existing) = self.favorites.find_by_target(user_id, target).await? {
            self.favorites.delete(existing.id).await?;
            return Ok(false);
        }
        self.add(user_id, target).await?;
        Ok(true)
    }

    pub async fn list(
        &self,
        user_id: i64,
        kind: Option<FavoriteKind>,
    ) -> AppResult<Vec<(favorite::Model, FavoriteTarget)>> {
        let favorites = self.favorites.find_by_user(user_id).await?;
        let mut result = Vec::with_capacity(favorites.len());
        for favorite in favorites {
            let target = favorite.target()?;
            if kind.is_none_or(|kind| kind.matches(target)) {
                result.push((favorite, target));
            }
        }
        Ok(result)
    }
}
