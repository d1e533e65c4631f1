use std::sync::Arc;

use color_eyre::eyre::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::database::Database;
use crate::entities::favorite::{self, FavoriteTarget};

#[derive(Clone)]
pub struct FavoriteRepository {
    db: Arc<Database>,
}

impl FavoriteRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn add(&self, user_id: i64, target: FavoriteTarget) -> Result<favorite::Model> {
        let (song_id, playlist_id) = target.columns();
        favorite::ActiveModel {
            user_id: Set(user_id),
            song_id: Set(song_id),
            playlist_id: Set(playlist_id),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(&self.db.conn)
        .await
        .wrap_err("Failed to insert favorite")
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = favorite::Entity::delete_by_id(id)
            .exec(&self.db.conn)
            .await
            .wrap_err("Failed to delete favorite")?;
        Ok(result.rows_affected > 0)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<favorite::Model>> {
        favorite::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to get favorite")
    }

    pub async fn get_all(&self) -> Result<Vec<favorite::Model>> {
        favorite::Entity::find()
            .order_by_asc(favorite::Column::Id)
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to get favorites")
    }

    /// A user's favorites, newest first.
    pub async fn find_by_user(&self, user_id: i64) -> Result<Vec<favorite::Model>> {
        favorite::Entity::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .order_by_desc(favorite::Column::CreatedAt)
            .order_by_desc(favorite::Column::Id)
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to query favorites by user")
    }

    pub async fn find_by_target(
        &self,
        user_id: i64,
        target: FavoriteTarget,
    ) -> Result<Option<favorite::Model>> {
        let query = favorite::Entity::find().filter(favorite::Column::UserId.eq(user_id));
        let query = match target {
            FavoriteTarget::Song(song_id) => query.filter(favorite::Column::SongId.eq(song_id)),
            FavoriteTarget::Playlist(playlist_id) => {
                query.filter(favorite::Column::PlaylistId.eq(playlist_id))
            }
        };

        query
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to query favorite by target")
    }
}
