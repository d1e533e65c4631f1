pub mod album;
pub mod artist;
pub mod email_verification;
pub mod favorite;
pub mod playlist;
pub mod premium_user;
pub mod query;
pub mod rating;
pub mod song;
pub mod user;

use sea_orm::{DbErr, SqlErr};

pub use album::AlbumRepository;
pub use artist::ArtistRepository;
pub use email_verification::EmailVerificationRepository;
pub use favorite::FavoriteRepository;
pub use playlist::PlaylistRepository;
pub use premium_user::PremiumUserRepository;
pub use query::{PaginatedResult, Pagination};
pub use rating::RatingRepository;
pub use song::{SongFilter, SongRepository};
pub use user::UserRepository;

/// True when the report wraps a unique-constraint violation from the database.
pub fn is_unique_violation(report: &color_eyre::Report) -> bool {
    report
        .downcast_ref::<DbErr>()
        .and_then(DbErr::sql_err)
        .is_some_and(|err| matches!(err, SqlErr::UniqueConstraintViolation(_)))
}
