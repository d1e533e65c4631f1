use std::sync::Arc;

use color_eyre::eyre::eyre;
use sea_orm::{IntoActiveModel, Set};

use crate::database::Database;
use crate::entities::{album, artist, song};
use crate::error::{AppError, AppResult, Resource};
use crate::repositories::album::NewAlbum;
use crate::repositories::{
    AlbumRepository, ArtistRepository, PaginatedResult, Pagination, SongRepository,
};
use crate::services::validation;

#[derive(Debug, Clone)]
pub struct AlbumInput {
    pub artist_id: i64,
    pub title: String,
    pub release_year: Option<i32>,
    pub cover_url: Option<String>,
}

pub struct AlbumDetails {
    pub album: album::Model,
    pub artist: artist::Model,
    pub songs: Vec<song::Model>,
}

pub struct AlbumService {
    albums: AlbumRepository,
    artists: ArtistRepository,
    songs: SongRepository,
}

impl AlbumService {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            albums: AlbumRepository::new(db.clone()),
            artists: ArtistRepository::new(db.clone()),
            songs: SongRepository::new(db),
        }
    }

    async fn ensure_artist(&self, artist_id: i64) -> AppResult<()> {
        if self.artists.get_by_id(artist_id).await?.is_none() {
            return Err(AppError::NotFound(Resource::Artist));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn create(&self, input: AlbumInput) -> AppResult<album::Model> {
        let title = validation::required("Album title", &input.title)?;
        self.ensure_artist(input.artist_id).await?;

        Ok(self
            .albums
            .add(NewAlbum {
                artist_id: input.artist_id,
                title,
                release_year: input.release_year,
                cover_url: input.cover_url,
            })
            .await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update(&self, id: i64, input: AlbumInput) -> AppResult<album::Model> {
        let existing = self.get_model(id).await?;
        let title = validation::required("Album title", &input.title)?;
        if input.artist_id != existing.artist_id {
            self.ensure_artist(input.artist_id).await?;
        }

        let mut active = existing.into_active_model();
        active.artist_id = Set(input.artist_id);
        active.title = Set(title);
        active.release_year = Set(input.release_year);
        active.cover_url = Set(input.cover_url);
        Ok(self.albums.update(active).await?)
    }

    /// Songs on the album become singles.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.albums.delete(id).await? {
            return Err(AppError::NotFound(Resource::Album));
        }
        Ok(())
    }

    async fn get_model(&self, id: i64) -> AppResult<album::Model> {
        self.albums
            .get_by_id(id)
            .await?
            .ok_or(AppError::NotFound(Resource::Album))
    }

    pub async fn get(&self, id: i64) -> AppResult<AlbumDetails> {
        let (album, artist) = self
            .albums
            .get_with_artist(id)
            .await?
            .ok_or(AppError::NotFound(Resource::Album))?;
        let artist = artist.ok_or(eyre!("Album {id} has no artist"))?;
        let songs = self.songs.find_by_album(id).await?;

        Ok(AlbumDetails {
            album,
            artist,
            songs,
        })
    }

    pub async fn list(&self, pagination: Pagination) -> AppResult<PaginatedResult<album::Model>> {
        Ok(self.albums.get_all(pagination).await?)
    }

    pub async fn list_by_artist(&self, artist_id: i64) -> AppResult<Vec<album::Model>> {
        self.ensure_artist(artist_id).await?;
        Ok(self.albums.find_by_artist(artist_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{insert_artist, insert_song, test_db};

    fn input(artist_id: i64, title: &str) -> AlbumInput {
        AlbumInput {
            artist_id,
            title: title.to_string(),
            release_year: Some(1998),
            cover_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_requires_artist() {
        let db = test_db().await;
        let service = AlbumService::new(db.clone());
        assert!(matches!(
            service.create(input(42, "Mezzanine")).await,
            Err(AppError::NotFound(Resource::Artist))
        ));

        let artist = insert_artist(&db, "Massive Attack").await;
        let album = service.create(input(artist.id, "Mezzanine")).await.unwrap();
        assert_eq!(album.release_year, Some(1998));
    }

    #[tokio::test]
    async fn test_get_includes_artist_and_songs() {
        let db = test_db().await;
        let artist = insert_artist(&db, "Massive Attack").await;
        let service = AlbumService::new(db.clone());
        let album = service.create(input(artist.id, "Mezzanine")).await.unwrap();
        insert_song(&db, artist.id, Some(album.id), "Teardrop", "trip-hop").await;
        insert_song(&db, artist.id, Some(album.id), "Angel", "trip-hop").await;

        let details = service.get(album.id).await.unwrap();
        assert_eq!(details.artist.id, artist.id);
        assert_eq!(details.songs.len(), 2);

        assert!(matches!(
            service.get(999).await,
            Err(AppError::NotFound(Resource::Album))
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = test_db().await;
        let artist = insert_artist(&db, "Massive Attack").await;
        let service = AlbumService::new(db.clone());
        let album = service.create(input(artist.id, "Mezzanin")).await.unwrap();

        let updated = service
            .update(album.id, input(artist.id, "Mezzanine"))
            .await
            .unwrap();
        assert_eq!(updated.title, "Mezzanine");
        assert!(matches!(
            service.update(album.id, input(999, "Mezzanine")).await,
            Err(AppError::NotFound(Resource::Artist))
        ));

        let song = insert_song(&db, artist.id, Some(album.id), "Teardrop", "trip-hop").await;
        service.delete(album.id).await.unwrap();
        let song = SongRepository::new(db).get_by_id(song.id).await.unwrap().unwrap();
        assert_eq!(song.album_id, None);

        assert!(matches!(
            service.delete(album.id).await,
            Err(AppError::NotFound(Resource::Album))
        ));
    }

    #[tokio::test]
    async fn test_list_by_artist() {
        let db = test_db().await;
        let artist = insert_artist(&db, "Massive Attack").await;
        let other = insert_artist(&db, "Portishead").await;
        let service = AlbumService::new(db);
        service.create(input(artist.id, "Mezzanine")).await.unwrap();
        service.create(input(artist.id, "Protection")).await.unwrap();
        service.create(input(other.id, "Dummy")).await.unwrap();

        assert_eq!(service.list_by_artist(artist.id).await.unwrap().len(), 2);
        assert_eq!(service.list(Pagination::default()).await.unwrap().total_count, 3);
        assert!(matches!(
            service.list_by_artist(999).await,
            Err(AppError::NotFound(Resource::Artist))
        ));
    }
}
