use std::sync::Arc;

use color_eyre::eyre::{Context, Result};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::database::Database;
use crate::entities::rating;

/// Aggregate of all ratings for one song.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    pub average: Option<f64>,
    pub count: u64,
}

#[derive(Clone)]
pub struct RatingRepository {
    db: Arc<Database>,
}

impl RatingRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn add(&self, user_id: i64, song_id: i64, value: i32) -> Result<rating::Model> {
        rating::ActiveModel {
            user_id: Set(user_id),
            song_id: Set(song_id),
            value: Set(value),
            ..Default::default()
        }
        .insert(&self.db.conn)
        .await
        .wrap_err("Failed to insert rating")
    }

    pub async fn update(&self, model: rating::ActiveModel) -> Result<rating::Model> {
        model
            .update(&self.db.conn)
            .await
            .wrap_err("Failed to update rating")
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = rating::Entity::delete_by_id(id)
            .exec(&self.db.conn)
            .await
            .wrap_err("Failed to delete rating")?;
        Ok(result.rows_affected > 0)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<rating::Model>> {
        rating::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to get rating")
    }

    pub async fn get_all(&self) -> Result<Vec<rating::Model>> {
        rating::Entity::find()
            .order_by_asc(rating::Column::Id)
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to get ratings")
    }

    pub async fn find_by_user(&self, user_id: i64) -> Result<Vec<rating::Model>> {
        rating::Entity::find()
            .filter(rating::Column::UserId.eq(user_id))
            .order_by_desc(rating::Column::UpdatedAt)
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to query ratings by user")
    }

    pub async fn find_by_user_and_song(
        &self,
        user_id: i64,
        song_id: i64,
    ) -> Result<Option<rating::Model>> {
        rating::Entity::find()
            .filter(rating::Column::UserId.eq(user_id))
            .filter(rating::Column::SongId.eq(song_id))
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to query rating by user and song")
    }

    pub async fn summary_for_song(&self, song_id: i64) -> Result<RatingSummary> {
        let row: Option<(Option<f64>, i64)> = rating::Entity::find()
            .select_only()
            .column_as(Expr::expr(Func::avg(Expr::col(rating::Column::Value))), "average")
            .column_as(Expr::expr(Func::count(Expr::col(rating::Column::Value))), "count")
            .filter(rating::Column::SongId.eq(song_id))
            .into_tuple()
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to aggregate ratings")?;

        let (average, count) = row.unwrap_or((None, 0));
        Ok(RatingSummary {
            average,
            count: count.max(0) as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::is_unique_violation;
    use crate::test_utils::{insert_artist, insert_song, insert_user, test_db};

    #[tokio::test]
    async fn test_summary_for_song() {
        let db = test_db().await;
        let artist = insert_artist(&db, "Air").await;
        let song = insert_song(&db, artist.id, None, "Song", "pop").await;
        let repo = RatingRepository::new(db.clone());

        let empty = repo.summary_for_song(song.id).await.unwrap();
        assert_eq!(empty, RatingSummary { average: None, count: 0 });

        for (name, value) in [("a", 5), ("b", 4), ("c", 2)] {
            let user = insert_user(&db, name).await;
            repo.add(user.id, song.id, value).await.unwrap();
        }

        let summary = repo.summary_for_song(song.id).await.unwrap();
        assert_eq!(summary.count, 3);
        let average = summary.average.unwrap();
        assert!((average - 11.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_second_rating_for_same_song_hits_unique_index() {
        let db = test_db().await;
        let user = insert_user(&db, "mara").await;
        let artist = insert_artist(&db, "Air").await;
        let song = insert_song(&db, artist.id, None, "Song", "pop").await;

        let repo = RatingRepository::new(db);
        repo.add(user.id, song.id, 3).await.unwrap();
        let err = repo.add(user.id, song.id, 4).await.unwrap_err();
        assert!(is_unique_violation(&err));
        assert_eq!(repo.summary_for_song(song.id).await.unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_value_outside_range_is_rejected_by_schema() {
        let db = test_db().await;
        let user = insert_user(&db, "mara").await;
        let artist = insert_artist(&db, "Air").await;
        let song = insert_song(&db, artist.id, None, "Song", "pop").await;

        let repo = RatingRepository::new(db);
        assert!(repo.add(user.id, song.id, 9).await.is_err());
    }
}
