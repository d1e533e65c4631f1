use std::sync::Arc;

use color_eyre::eyre::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::database::Database;
use crate::entities::{album, artist};
use crate::repositories::query::{PaginatedResult, Pagination, fetch_page};

pub struct NewAlbum {
    pub artist_id: i64,
    pub title: String,
    pub release_year: Option<i32>,
    pub cover_url: Option<String>,
}

#[derive(Clone)]
pub struct AlbumRepository {
    db: Arc<Database>,
}

impl AlbumRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn add(&self, new_album: NewAlbum) -> Result<album::Model> {
        album::ActiveModel {
            artist_id: Set(new_album.artist_id),
            title: Set(new_album.title),
            release_year: Set(new_album.release_year),
            cover_url: Set(new_album.cover_url),
            ..Default::default()
        }
        .insert(&self.db.conn)
        .await
        .wrap_err("Failed to insert album")
    }

    pub async fn update(&self, model: album::ActiveModel) -> Result<album::Model> {
        model
            .update(&self.db.conn)
            .await
            .wrap_err("Failed to update album")
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = album::Entity::delete_by_id(id)
            .exec(&self.db.conn)
            .await
            .wrap_err("Failed to delete album")?;
        Ok(result.rows_affected > 0)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<album::Model>> {
        album::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to get album")
    }

    pub async fn get_with_artist(
        &self,
        id: i64,
    ) -> Result<Option<(album::Model, Option<artist::Model>)>> {
        album::Entity::find_by_id(id)
            .find_also_related(artist::Entity)
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to get album with artist")
    }

    pub async fn get_all(&self, pagination: Pagination) -> Result<PaginatedResult<album::Model>> {
        let query = album::Entity::find().order_by_asc(album::Column::Title);
        fetch_page(&self.db.conn, query, pagination).await
    }

    /// Albums of one artist, newest release first.
    pub async fn find_by_artist(&self, artist_id: i64) -> Result<Vec<album::Model>> {
        album::Entity::find()
            .filter(album::Column::ArtistId.eq(artist_id))
            .order_by_desc(album::Column::ReleaseYear)
            .order_by_asc(album::Column::Title)
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to query albums by artist")
    }
}
