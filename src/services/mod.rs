pub mod album;
pub mod artist;
pub mod auth;
pub mod favorite;
pub mod mailer;
pub mod password;
pub mod playlist;
pub mod premium;
pub mod rating;
pub mod song;
pub mod token;
pub mod user;
pub mod validation;

use crate::error::AppError;
use crate::repositories::is_unique_violation;

/// Map a unique-constraint failure from a racing insert to the same conflict a pre-check reports.
pub(crate) fn unique_violation_as_conflict(
    message: &'static str,
) -> impl FnOnce(color_eyre::Report) -> AppError {
    move |report| {
        if is_unique_violation(&report) {
            AppError::conflict(message)
        } else {
            AppError::Internal(report)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::RatingRepository;
    use crate::test_utils::{insert_artist, insert_song, insert_user, test_db};

    #[tokio::test]
    async fn test_racing_insert_maps_to_conflict() {
        let db = test_db().await;
        let user = insert_user(&db, "mara").await;
        let artist = insert_artist(&db, "Air").await;
        let song = insert_song(&db, artist.id, None, "Kelly", "electronic").await;
        let ratings = RatingRepository::new(db);

        // Both writers passed the existence check; the second insert loses on the index.
        ratings.add(user.id, song.id, 4).await.unwrap();
        let err = ratings
            .add(user.id, song.id, 2)
            .await
            .map_err(unique_violation_as_conflict("Already rated"))
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(message) if message == "Already rated"));
    }

    #[tokio::test]
    async fn test_other_failures_stay_internal() {
        let db = test_db().await;
        let user = insert_user(&db, "mara").await;
        let ratings = RatingRepository::new(db);

        let err = ratings
            .add(user.id, 999, 4)
            .await
            .map_err(unique_violation_as_conflict("Already rated"))
            .unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
    }
}
