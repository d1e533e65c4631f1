use chrono::{DateTime, Utc};
use color_eyre::eyre::{Result, eyre};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What a favorite points at. A row carries exactly one of `song_id` / `playlist_id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum FavoriteTarget {
    Song(i64),
    Playlist(i64),
}

impl FavoriteTarget {
    /// Column values for `(song_id, playlist_id)`.
    pub fn columns(self) -> (Option<i64>, Option<i64>) {
        match self {
            FavoriteTarget::Song(id) => (Some(id), None),
            FavoriteTarget::Playlist(id) => (None, Some(id)),
        }
    }
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "favorites")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub song_id: Option<i64>,
    pub playlist_id: Option<i64>,
    pub created_at: DateTime<Utc>,

    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,
    #[sea_orm(belongs_to, from = "song_id", to = "id")]
    pub song: HasOne<super::song::Entity>,
    #[sea_orm(belongs_to, from = "playlist_id", to = "id")]
    pub playlist: HasOne<super::playlist::Entity>,
}

impl Model {
    pub fn target(&self) -> Result<FavoriteTarget> {
        match (self.song_id, self.playlist_id) {
            (Some(song_id), None) => Ok(FavoriteTarget::Song(song_id)),
            (None, Some(playlist_id)) => Ok(FavoriteTarget::Playlist(playlist_id)),
            (song_id, playlist_id) => Err(eyre!(
                "Favorite {} must reference exactly one target (song_id: {:?}, playlist_id: {:?})",
                self.id,
                song_id,
                playlist_id
            )),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
