use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{IntoActiveModel, Set};
use url::Url;

use crate::database::Database;
use crate::entities::song;
use crate::error::{AppError, AppResult, Resource};
use crate::repositories::song::NewSong;
use crate::repositories::{
    AlbumRepository, ArtistRepository, PaginatedResult, Pagination, PremiumUserRepository,
    SongFilter, SongRepository,
};
use crate::services::validation;

#[derive(Debug, Clone)]
pub struct SongInput {
    pub artist_id: i64,
    pub album_id: Option<i64>,
    pub title: String,
    pub genre: String,
    pub duration_seconds: i32,
    pub audio_url: String,
    pub premium_only: bool,
}

#[derive(Debug, Clone)]
pub struct StreamInfo {
    pub song_id: i64,
    pub audio_url: String,
    pub premium_only: bool,
}

pub struct SongService {
    songs: SongRepository,
    artists: ArtistRepository,
    albums: AlbumRepository,
    premium: PremiumUserRepository,
}

impl SongService {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            songs: SongRepository::new(db.clone()),
            artists: ArtistRepository::new(db.clone()),
            albums: AlbumRepository::new(db.clone()),
            premium: PremiumUserRepository::new(db),
        }
    }

    /// Validated copy of the input, with the artist and album checked.
    async fn check_input(&self, input: SongInput) -> AppResult<SongInput> {
        let title = validation::required("Song title", &input.title)?;
        let genre = validation::required("Genre", &input.genre)?.to_lowercase();
        if input.duration_seconds <= 0 {
            return Err(AppError::validation("Duration must be positive"));
        }
        let audio_url = input.audio_url.trim().to_string();
        if Url::parse(&audio_url).is_err() {
            return Err(AppError::validation("Audio URL must be an absolute URL"));
        }

        if self.artists.get_by_id(input.artist_id).await?.is_none() {
            return Err(AppError::NotFound(Resource::Artist));
        }
        if let Some(album_id) = input.album_id {
            let album = self
                .albums
                .get_by_id(album_id)
                .await?
                .ok_or(AppError::NotFound(Resource::Album))?;
            if album.artist_id != input.artist_id {
                return Err(AppError::validation(
                    "Album belongs to a different artist than the song",
                ));
            }
        }

        Ok(SongInput {
            title,
            genre,
            audio_url,
            ..input
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn create(&self, input: SongInput) -> AppResult<song::Model> {
        let input = self.check_input(input).await?;
        Ok(self
            .songs
            .add(NewSong {
                artist_id: input.artist_id,
                album_id: input.album_id,
                title: input.title,
                genre: input.genre,
                duration_seconds: input.duration_seconds,
                audio_url: input.audio_url,
                premium_only: input.premium_only,
            })
            .await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update(&self, id: i64, input: SongInput) -> AppResult<song::Model> {
        let existing = self.get(id).await?;
        let input = self.check_input(input).await?;

        let mut active = existing.into_active_model();
        active.artist_id = Set(input.artist_id);
        active.album_id = Set(input.album_id);
        active.title = Set(input.title);
        active.genre = Set(input.genre);
        active.duration_seconds = Set(input.duration_seconds);
        active.audio_url = Set(input.audio_url);
        active.premium_only = Set(input.premium_only);
        Ok(self.songs.update(active).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.songs.delete(id).await? {
            return Err(AppError::NotFound(Resource::Song));
        }
        Ok(())
    }

    pub async fn get(&self, id: i64) -> AppResult<song::Model> {
        self.songs
            .get_by_id(id)
            .await?
            .ok_or(AppError::NotFound(Resource::Song))
    }

    pub async fn list(
        &self,
        filter: SongFilter,
        pagination: Pagination,
    ) -> AppResult<PaginatedResult<song::Model>> {
        let filter = SongFilter {
            genre: filter.genre.map(|genre| genre.trim().to_lowercase()),
            ..filter
        };
        Ok(self.songs.get_all(&filter, pagination).await?)
    }

    pub async fn list_genres(&self) -> AppResult<Vec<String>> {
        Ok(self.songs.list_genres().await?)
    }

    pub async fn stream(&self, song_id: i64, user_id: i64) -> AppResult<StreamInfo> {
        self.stream_at(song_id, user_id, Utc::now()).await
    }

    /// Premium-only songs need a subscription that is active at `now`.
    #[tracing::instrument(skip(self))]
    pub async fn stream_at(
        &self,
        song_id: i64,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<StreamInfo> {
        let song = self.get(song_id).await?;

        if song.premium_only {
            let subscription = self.premium.find_by_user(user_id).await?;
            let active = subscription.is_some_and(|subscription| subscription.is_active(now));
            if !active {
                return Err(AppError::forbidden(
                    "An active premium subscription is required to stream this song",
                ));
            }
        }

        Ok(StreamInfo {
            song_id: song.id,
            audio_url: song.audio_url,
            premium_only: song.premium_only,
        })
    }
}
