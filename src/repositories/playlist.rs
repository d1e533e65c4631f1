use std::sync::Arc;

use chrono::Utc;
use color_eyre::eyre::{Context, Result};
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::database::Database;
use crate::entities::{playlist, playlist_song, song};
use crate::repositories::query::{PaginatedResult, Pagination, fetch_page};

pub struct NewPlaylist {
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
}

#[derive(Clone)]
pub struct PlaylistRepository {
    db: Arc<Database>,
}

impl PlaylistRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn add(&self, new_playlist: NewPlaylist) -> Result<playlist::Model> {
        playlist::ActiveModel {
            user_id: Set(new_playlist.user_id),
            name: Set(new_playlist.name),
            description: Set(new_playlist.description),
            is_public: Set(new_playlist.is_public),
            ..Default::default()
        }
        .insert(&self.db.conn)
        .await
        .wrap_err("Failed to insert playlist")
    }

    pub async fn update(&self, model: playlist::ActiveModel) -> Result<playlist::Model> {
        model
            .update(&self.db.conn)
            .await
            .wrap_err("Failed to update playlist")
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = playlist::Entity::delete_by_id(id)
            .exec(&self.db.conn)
            .await
            .wrap_err("Failed to delete playlist")?;
        Ok(result.rows_affected > 0)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<playlist::Model>> {
        playlist::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to get playlist")
    }

    pub async fn get_all(&self, pagination: Pagination) -> Result<PaginatedResult<playlist::Model>> {
        let query = playlist::Entity::find().order_by_desc(playlist::Column::UpdatedAt);
        fetch_page(&self.db.conn, query, pagination).await
    }

    pub async fn find_by_owner(&self, user_id: i64) -> Result<Vec<playlist::Model>> {
        playlist::Entity::find()
            .filter(playlist::Column::UserId.eq(user_id))
            .order_by_desc(playlist::Column::UpdatedAt)
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to query playlists by owner")
    }

    pub async fn find_public(
        &self,
        pagination: Pagination,
    ) -> Result<PaginatedResult<playlist::Model>> {
        let query = playlist::Entity::find()
            .filter(playlist::Column::IsPublic.eq(true))
            .order_by_desc(playlist::Column::UpdatedAt);
        fetch_page(&self.db.conn, query, pagination).await
    }

    pub async fn contains_song(&self, playlist_id: i64, song_id: i64) -> Result<bool> {
        let existing = playlist_song::Entity::find()
            .filter(
                Condition::all()
                    .add(playlist_song::Column::PlaylistId.eq(playlist_id))
                    .add(playlist_song::Column::SongId.eq(song_id)),
            )
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to check existing playlist song")?;
        Ok(existing.is_some())
    }

    /// Append a song after the current last position and bump the playlist's `updated_at`.
    pub async fn add_song(&self, playlist_id: i64, song_id: i64) -> Result<playlist_song::Model> {
        let txn = self
            .db
            .conn
            .begin()
            .await
            .wrap_err("Failed to start transaction")?;

        let last = playlist_song::Entity::find()
            .filter(playlist_song::Column::PlaylistId.eq(playlist_id))
            .order_by_desc(playlist_song::Column::Position)
            .one(&txn)
            .await
            .wrap_err("Failed to find last playlist position")?;
        let position = last.map_or(0, |entry| entry.position + 1);

        let now = Utc::now();
        let entry = playlist_song::ActiveModel {
            playlist_id: Set(playlist_id),
            song_id: Set(song_id),
            position: Set(position),
            added_at: Set(now),
        }
        .insert(&txn)
        .await
        .wrap_err("Failed to add song to playlist")?;

        playlist::Entity::update_many()
            .col_expr(playlist::Column::UpdatedAt, Expr::value(now))
            .filter(playlist::Column::Id.eq(playlist_id))
            .exec(&txn)
            .await
            .wrap_err("Failed to update playlist")?;

        txn.commit().await.wrap_err("Failed to commit transaction")?;
        Ok(entry)
    }

    pub async fn remove_song(&self, playlist_id: i64, song_id: i64) -> Result<bool> {
        let result = playlist_song::Entity::delete_many()
            .filter(playlist_song::Column::PlaylistId.eq(playlist_id))
            .filter(playlist_song::Column::SongId.eq(song_id))
            .exec(&self.db.conn)
            .await
            .wrap_err("Failed to remove song from playlist")?;

        if result.rows_affected > 0 {
            playlist::Entity::update_many()
                .col_expr(playlist::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(playlist::Column::Id.eq(playlist_id))
                .exec(&self.db.conn)
                .await
                .wrap_err("Failed to update playlist")?;
        }

        Ok(result.rows_affected > 0)
    }

    /// Songs in playlist order.
    pub async fn list_songs(
        &self,
        playlist_id: i64,
    ) -> Result<Vec<(playlist_song::Model, song::Model)>> {
        let rows = playlist_song::Entity::find()
            .filter(playlist_song::Column::PlaylistId.eq(playlist_id))
            .order_by_asc(playlist_song::Column::Position)
            .find_also_related(song::Entity)
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to fetch playlist songs")?;

        Ok(rows
            .into_iter()
            .filter_map(|(entry, song)| song.map(|song| (entry, song)))
            .collect())
    }
}
