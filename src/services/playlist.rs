use std::sync::Arc;

use sea_orm::{IntoActiveModel, Set};

use crate::database::Database;
use crate::entities::{playlist, playlist_song, song};
use crate::error::{AppError, AppResult, Resource};
use crate::repositories::playlist::NewPlaylist;
use crate::repositories::{PaginatedResult, Pagination, PlaylistRepository, SongRepository};
use crate::services::{unique_violation_as_conflict, validation};

#[derive(Debug, Clone)]
pub struct PlaylistInput {
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
}

pub struct PlaylistDetails {
    pub playlist: playlist::Model,
    pub songs: Vec<(playlist_song::Model, song::Model)>,
}

pub struct PlaylistService {
    playlists: PlaylistRepository,
    songs: SongRepository,
}

impl PlaylistService {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            playlists: PlaylistRepository::new(db.clone()),
            songs: SongRepository::new(db),
        }
    }

    /// The playlist if `viewer_id` may see it. Someone else's private playlist reads as missing.
    pub async fn visible(&self, id: i64, viewer_id: i64) -> AppResult<playlist::Model> {
        match self.playlists.get_by_id(id).await? {
            Some(playlist) if playlist.is_public || playlist.user_id == viewer_id => Ok(playlist),
            _ => Err(AppError::NotFound(Resource::Playlist)),
        }
    }

    async fn owned(&self, id: i64, user_id: i64) -> AppResult<playlist::Model> {
        let playlist = self.visible(id, user_id).await?;
        if playlist.user_id != user_id {
            return Err(AppError::forbidden("Only the owner can modify this playlist"));
        }
        Ok(playlist)
    }

    #[tracing::instrument(skip(self))]
    pub async fn create(&self, owner_id: i64, input: PlaylistInput) -> AppResult<playlist::Model> {
        let name = validation::required("Playlist name", &input.name)?;
        Ok(self
            .playlists
            .add(NewPlaylist {
                user_id: owner_id,
                name,
                description: input.description,
                is_public: input.is_public,
            })
            .await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update(
        &self,
        id: i64,
        user_id: i64,
        input: PlaylistInput,
    ) -> AppResult<playlist::Model> {
        let playlist = self.owned(id, user_id).await?;
        let name = validation::required("Playlist name", &input.name)?;

        let mut active = playlist.into_active_model();
        active.name = Set(name);
        active.description = Set(input.description);
        active.is_public = Set(input.is_public);
        Ok(self.playlists.update(active).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64, user_id: i64) -> AppResult<()> {
        self.owned(id, user_id).await?;
        if !self.playlists.delete(id).await? {
            return Err(AppError::NotFound(Resource::Playlist));
        }
        Ok(())
    }

    pub async fn get(&self, id: i64, viewer_id: i64) -> AppResult<PlaylistDetails> {
        let playlist = self.visible(id, viewer_id).await?;
        let songs = self.playlists.list_songs(id).await?;
        Ok(PlaylistDetails { playlist, songs })
    }

    pub async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<playlist::Model>> {
        Ok(self.playlists.find_by_owner(user_id).await?)
    }

    pub async fn list_public(
        &self,
        pagination: Pagination,
    ) -> AppResult<PaginatedResult<playlist::Model>> {
        Ok(self.playlists.find_public(pagination).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn add_song(
        &self,
        id: i64,
        user_id: i64,
        song_id: i64,
    ) -> AppResult<playlist_song::Model> {
        self.owned(id, user_id).await?;
        if self.songs.get_by_id(song_id).await?.is_none() {
            return Err(AppError::NotFound(Resource::Song));
        }
        if self.playlists.contains_song(id, song_id).await? {
            return Err(AppError::conflict("Song is already in the playlist"));
        }

        self.playlists
            .add_song(id, song_id)
            .await
            .map_err(unique_violation_as_conflict("Song is already in the playlist"))
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove_song(&self, id: i64, user_id: i64, song_id: i64) -> AppResult<()> {
        self.owned(id, user_id).await?;
        if !self.playlists.remove_song(id, song_id).await? {
            return Err(AppError::NotFound(Resource::PlaylistSong));
        }
        Ok(())
    }

    pub async fn list_songs(
        &self,
        id: i64,
        viewer_id: i64,
    ) -> AppResult<Vec<(playlist_song::Model, song::Model)>> {
        self.visible(id, viewer_id).await?;
        Ok(self.playlists.list_songs(id).await?)
    }
}
