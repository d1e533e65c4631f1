use std::sync::Arc;

use color_eyre::eyre::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::database::Database;
use crate::entities::song;
use crate::repositories::query::{PaginatedResult, Pagination, apply_text_search, fetch_page};

pub struct NewSong {
    pub artist_id: i64,
    pub album_id: Option<i64>,
    pub title: String,
    pub genre: String,
    pub duration_seconds: i32,
    pub audio_url: String,
    pub premium_only: bool,
}

/// Optional narrowing for song listings; all set fields must match.
#[derive(Debug, Clone, Default)]
pub struct SongFilter {
    pub artist_id: Option<i64>,
    pub album_id: Option<i64>,
    pub genre: Option<String>,
    pub search: Option<String>,
}

#[derive(Clone)]
pub struct SongRepository {
    db: Arc<Database>,
}

impl SongRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn add(&self, new_song: NewSong) -> Result<song::Model> {
        song::ActiveModel {
            artist_id: Set(new_song.artist_id),
            album_id: Set(new_song.album_id),
            title: Set(new_song.title),
            genre: Set(new_song.genre),
            duration_seconds: Set(new_song.duration_seconds),
            audio_url: Set(new_song.audio_url),
            premium_only: Set(new_song.premium_only),
            ..Default::default()
        }
        .insert(&self.db.conn)
        .await
        .wrap_err("Failed to insert song")
    }

    pub async fn update(&self, model: song::ActiveModel) -> Result<song::Model> {
        model
            .update(&self.db.conn)
            .await
            .wrap_err("Failed to update song")
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = song::Entity::delete_by_id(id)
            .exec(&self.db.conn)
            .await
            .wrap_err("Failed to delete song")?;
        Ok(result.rows_affected > 0)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<song::Model>> {
        song::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to get song")
    }

    pub async fn get_all(
        &self,
        filter: &SongFilter,
        pagination: Pagination,
    ) -> Result<PaginatedResult<song::Model>> {
        let mut query = song::Entity::find();

        if let Some(artist_id) = filter.artist_id {
            query = query.filter(song::Column::ArtistId.eq(artist_id));
        }
        if let Some(album_id) = filter.album_id {
            query = query.filter(song::Column::AlbumId.eq(album_id));
        }
        if let Some(genre) = filter.genre.as_deref() {
            query = query.filter(song::Column::Genre.eq(genre));
        }
        if let Some(term) = filter.search.as_deref() {
            query = apply_text_search(query, vec![song::Column::Title], term);
        }

        let query = query
            .order_by_asc(song::Column::Title)
            .order_by_asc(song::Column::Id);
        fetch_page(&self.db.conn, query, pagination).await
    }

    pub async fn find_by_artist(&self, artist_id: i64) -> Result<Vec<song::Model>> {
        song::Entity::find()
            .filter(song::Column::ArtistId.eq(artist_id))
            .order_by_asc(song::Column::Title)
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to query songs by artist")
    }

    pub async fn find_by_album(&self, album_id: i64) -> Result<Vec<song::Model>> {
        song::Entity::find()
            .filter(song::Column::AlbumId.eq(album_id))
            .order_by_asc(song::Column::Id)
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to query songs by album")
    }

    /// Distinct genres in alphabetical order.
    pub async fn list_genres(&self) -> Result<Vec<String>> {
        song::Entity::find()
            .select_only()
            .column(song::Column::Genre)
            .distinct()
            .order_by_asc(song::Column::Genre)
            .into_tuple::<String>()
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to list genres")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{insert_album, insert_artist, insert_song, test_db};

    #[tokio::test]
    async fn test_filters_combine() {
        let db = test_db().await;
        let air = insert_artist(&db, "Air").await;
        let daft = insert_artist(&db, "Daft Punk").await;
        let album = insert_album(&db, air.id, "Moon Safari").await;
        insert_song(&db, air.id, Some(album.id), "La Femme d'Argent", "electronic").await;
        insert_song(&db, air.id, Some(album.id), "Sexy Boy", "electronic").await;
        insert_song(&db, air.id, None, "Kelly Watch the Stars", "pop").await;
        insert_song(&db, daft.id, None, "One More Time", "electronic").await;

        let repo = SongRepository::new(db);

        let electronic_air = repo
            .get_all(
                &SongFilter {
                    artist_id: Some(air.id),
                    genre: Some("electronic".to_string()),
                    ..Default::default()
                },
                Pagination::default(),
            )
            .await
            .unwrap();
        assert_eq!(electronic_air.total_count, 2);

        let searched = repo
            .get_all(
                &SongFilter {
                    search: Some("time".to_string()),
                    ..Default::default()
                },
                Pagination::default(),
            )
            .await
            .unwrap();
        assert_eq!(searched.items.len(), 1);
        assert_eq!(searched.items[0].title, "One More Time");

        assert_eq!(repo.find_by_album(album.id).await.unwrap().len(), 2);
        assert_eq!(repo.find_by_artist(daft.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_genres_is_distinct_and_sorted() {
        let db = test_db().await;
        let air = insert_artist(&db, "Air").await;
        insert_song(&db, air.id, None, "a", "pop").await;
        insert_song(&db, air.id, None, "b", "electronic").await;
        insert_song(&db, air.id, None, "c", "pop").await;

        let repo = SongRepository::new(db);
        assert_eq!(
            repo.list_genres().await.unwrap(),
            vec!["electronic".to_string(), "pop".to_string()]
        );
    }

    #[tokio::test]
    async fn test_deleting_album_keeps_song_as_single() {
        let db = test_db().await;
        let air = insert_artist(&db, "Air").await;
        let album = insert_album(&db, air.id, "Moon Safari").await;
        let song = insert_song(&db, air.id, Some(album.id), "Sexy Boy", "electronic").await;

        crate::entities::album::Entity::delete_by_id(album.id)
            .exec(&db.conn)
            .await
            .unwrap();

        let repo = SongRepository::new(db);
        let reloaded = repo.get_by_id(song.id).await.unwrap().unwrap();
        assert_eq!(reloaded.album_id, None);
    }
}
