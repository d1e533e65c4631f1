use std::sync::Arc;

use sea_orm::{IntoActiveModel, Set};

use crate::database::Database;
use crate::entities::{artist, song};
use crate::error::{AppError, AppResult, Resource};
use crate::repositories::artist::NewArtist;
use crate::repositories::{ArtistRepository, PaginatedResult, Pagination, SongRepository};
use crate::services::{unique_violation_as_conflict, validation};

#[derive(Debug, Clone)]
pub struct ArtistInput {
    pub name: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
}

pub struct ArtistService {
    artists: ArtistRepository,
    songs: SongRepository,
}

impl ArtistService {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            artists: ArtistRepository::new(db.clone()),
            songs: SongRepository::new(db),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn create(&self, input: ArtistInput) -> AppResult<artist::Model> {
        let name = validation::required("Artist name", &input.name)?;
        if self.artists.find_by_name(&name).await?.is_some() {
            return Err(AppError::conflict(format!("Artist '{name}' already exists")));
        }

        self.artists
            .add(NewArtist {
                name,
                bio: input.bio,
                image_url: input.image_url,
            })
            .await
            .map_err(unique_violation_as_conflict("Artist already exists"))
    }

    #[tracing::instrument(skip(self))]
    pub async fn update(&self, id: i64, input: ArtistInput) -> AppResult<artist::Model> {
        let existing = self.get(id).await?;
        let name = validation::required("Artist name", &input.name)?;
        if let Some(other) = self.artists.find_by_name(&name).await?
            && other.id != id
        {
            return Err(AppError::conflict(format!("Artist '{name}' already exists")));
        }

        let mut active = existing.into_active_model();
        active.name = Set(name);
        active.bio = Set(input.bio);
        active.image_url = Set(input.image_url);
        self.artists
            .update(active)
            .await
            .map_err(unique_violation_as_conflict("Artist already exists"))
    }

    /// Deleting an artist removes their albums and songs.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.artists.delete(id).await? {
            return Err(AppError::NotFound(Resource::Artist));
        }
        Ok(())
    }

    pub async fn get(&self, id: i64) -> AppResult<artist::Model> {
        self.artists
            .get_by_id(id)
            .await?
            .ok_or(AppError::NotFound(Resource::Artist))
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        pagination: Pagination,
    ) -> AppResult<PaginatedResult<artist::Model>> {
        Ok(self.artists.get_all(search, pagination).await?)
    }

    pub async fn songs(&self, id: i64) -> AppResult<Vec<song::Model>> {
        self.get(id).await?;
        Ok(self.songs.find_by_artist(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{insert_album, insert_song, test_db};

    fn input(name: &str) -> ArtistInput {
        ArtistInput {
            name: name.to_string(),
            bio: None,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_reject_duplicate() {
        let db = test_db().await;
        let service = ArtistService::new(db);

        let artist = service.create(input("  Portishead ")).await.unwrap();
        assert_eq!(artist.name, "Portishead");

        assert!(matches!(
            service.create(input("Portishead")).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            service.create(input("   ")).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update() {
        let db = test_db().await;
        let service = ArtistService::new(db);
        let massive = service.create(input("Massive Attack")).await.unwrap();
        service.create(input("Tricky")).await.unwrap();

        let updated = service
            .update(
                massive.id,
                ArtistInput {
                    name: "Massive Attack".to_string(),
                    bio: Some("Bristol".to_string()),
                    image_url: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.bio.as_deref(), Some("Bristol"));

        assert!(matches!(
            service.update(massive.id, input("Tricky")).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            service.update(999, input("Nobody")).await,
            Err(AppError::NotFound(Resource::Artist))
        ));
    }

    #[tokio::test]
    async fn test_list_search_and_catalog() {
        let db = test_db().await;
        let service = ArtistService::new(db.clone());
        let air = service.create(input("Air")).await.unwrap();
        service.create(input("Aphex Twin")).await.unwrap();
        service.create(input("Burial")).await.unwrap();

        let page = service.list(Some("a"), Pagination::default()).await.unwrap();
        assert_eq!(page.total_count, 3);
        let page = service.list(Some("aph"), Pagination::default()).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Aphex Twin");

        let album = insert_album(&db, air.id, "Moon Safari").await;
        insert_song(&db, air.id, Some(album.id), "Sexy Boy", "electronic").await;
        assert_eq!(service.songs(air.id).await.unwrap().len(), 1);
        assert!(matches!(
            service.songs(999).await,
            Err(AppError::NotFound(Resource::Artist))
        ));

        service.delete(air.id).await.unwrap();
        assert!(matches!(
            service.delete(air.id).await,
            Err(AppError::NotFound(Resource::Artist))
        ));
    }
}
