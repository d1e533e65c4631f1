use std::fmt;

/// Kinds of records a lookup can miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Album,
    Artist,
    EmailVerification,
    Favorite,
    Playlist,
    PlaylistSong,
    Rating,
    Song,
    User,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Album => "Album",
            Resource::Artist => "Artist",
            Resource::EmailVerification => "Email verification",
            Resource::Favorite => "Favorite",
            Resource::Playlist => "Playlist",
            Resource::PlaylistSong => "Playlist song",
            Resource::Rating => "Rating",
            Resource::Song => "Song",
            Resource::User => "User",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(Resource),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Invalid webhook: {0}")]
    InvalidWebhook(String),
    #[error(transparent)]
    Internal(#[from] color_eyre::Report),
}

impl AppError {
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
