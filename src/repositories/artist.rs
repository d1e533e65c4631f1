use std::sync::Arc;

use color_eyre::eyre::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::database::Database;
use crate::entities::artist;
use crate::repositories::query::{PaginatedResult, Pagination, apply_text_search, fetch_page};

pub struct NewArtist {
    pub name: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Clone)]
pub struct ArtistRepository {
    db: Arc<Database>,
}

impl ArtistRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn add(&self, new_artist: NewArtist) -> Result<artist::Model> {
        artist::ActiveModel {
            name: Set(new_artist.name),
            bio: Set(new_artist.bio),
            image_url: Set(new_artist.image_url),
            ..Default::default()
        }
        .insert(&self.db.conn)
        .await
        .wrap_err("Failed to insert artist")
    }

    pub async fn update(&self, model: artist::ActiveModel) -> Result<artist::Model> {
        model
            .update(&self.db.conn)
            .await
            .wrap_err("Failed to update artist")
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = artist::Entity::delete_by_id(id)
            .exec(&self.db.conn)
            .await
            .wrap_err("Failed to delete artist")?;
        Ok(result.rows_affected > 0)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<artist::Model>> {
        artist::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to get artist")
    }

    /// All artists by name, optionally narrowed to names containing `search`.
    pub async fn get_all(
        &self,
        search: Option<&str>,
        pagination: Pagination,
    ) -> Result<PaginatedResult<artist::Model>> {
        let mut query = artist::Entity::find().order_by_asc(artist::Column::Name);
        if let Some(term) = search {
            query = apply_text_search(query, vec![artist::Column::Name], term);
        }
        fetch_page(&self.db.conn, query, pagination).await
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<artist::Model>> {
        artist::Entity::find()
            .filter(artist::Column::Name.eq(name))
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to query artist by name")
    }
}
