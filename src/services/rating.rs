use std::sync::Arc;

use sea_orm::{IntoActiveModel, Set};

use crate::database::Database;
use crate::entities::rating;
use crate::error::{AppError, AppResult, Resource};
use crate::repositories::rating::RatingSummary;
use crate::repositories::{RatingRepository, SongRepository};
use crate::services::{unique_violation_as_conflict, validation};

const ALREADY_RATED: &str = "You have already rated this song";

pub struct RatingService {
    ratings: RatingRepository,
    songs: SongRepository,
}

impl RatingService {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            ratings: RatingRepository::new(db.clone()),
            songs: SongRepository::new(db),
        }
    }

    async fn ensure_song(&self, song_id: i64) -> AppResult<()> {
        if self.songs.get_by_id(song_id).await?.is_none() {
            return Err(AppError::NotFound(Resource::Song));
        }
        Ok(())
    }

    /// Ratings of other users read as missing.
    async fn owned(&self, user_id: i64, rating_id: i64) -> AppResult<rating::Model> {
        match self.ratings.get_by_id(rating_id).await? {
            Some(rating) if rating.user_id == user_id => Ok(rating),
            _ => Err(AppError::NotFound(Resource::Rating)),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn rate(&self, user_id: i64, song_id: i64, value: i32) -> AppResult<rating::Model> {
        validation::rating_value(value)?;
        self.ensure_song(song_id).await?;
        if self
            .ratings
            .find_by_user_and_song(user_id, song_id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(ALREADY_RATED));
        }

        self.ratings
            .add(user_id, song_id, value)
            .await
            .map_err(unique_violation_as_conflict(ALREADY_RATED))
    }

    #[tracing::instrument(skip(self))]
    pub async fn update(
        &self,
        user_id: i64,
        rating_id: i64,
        value: i32,
    ) -> AppResult<rating::Model> {
        validation::rating_value(value)?;
        let rating = self.owned(user_id, rating_id).await?;

        let mut active = rating.into_active_model();
        active.value = Set(value);
        Ok(self.ratings.update(active).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, user_id: i64, rating_id: i64) -> AppResult<()> {
        self.owned(user_id, rating_id).await?;
        self.ratings.delete(rating_id).await?;
        Ok(())
    }

    pub async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<rating::Model>> {
        Ok(self.ratings.find_by_user(user_id).await?)
    }

    pub async fn song_summary(&self, song_id: i64) -> AppResult<RatingSummary> {
        self.ensure_song(song_id).await?;
        Ok(self.ratings.summary_for_song(song_id).await?)
    }
}
