//! JSON shapes exposed by the API. Entities never cross the HTTP boundary directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::favorite::FavoriteTarget;
use crate::entities::user::UserRole;
use crate::entities::{album, artist, favorite, playlist, playlist_song, rating, song, user};
use crate::repositories::rating::RatingSummary;
use crate::repositories::{Pagination, SongFilter};
use crate::services::album::{AlbumDetails, AlbumInput};
use crate::services::artist::ArtistInput;
use crate::services::auth::LoginResult;
use crate::services::favorite::FavoriteKind;
use crate::services::playlist::{PlaylistDetails, PlaylistInput};
use crate::services::premium::PremiumStatus;
use crate::services::song::{SongInput, StreamInfo};
use crate::services::user::ProfileUpdate;

// Requests

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendVerificationRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(request: UpdateProfileRequest) -> Self {
        ProfileUpdate {
            username: request.username,
            email: request.email,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
pub struct ArtistRequest {
    pub name: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
}

impl From<ArtistRequest> for ArtistInput {
    fn from(request: ArtistRequest) -> Self {
        ArtistInput {
            name: request.name,
            bio: request.bio,
            image_url: request.image_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AlbumRequest {
    pub artist_id: i64,
    pub title: String,
    pub release_year: Option<i32>,
    pub cover_url: Option<String>,
}

impl From<AlbumRequest> for AlbumInput {
    fn from(request: AlbumRequest) -> Self {
        AlbumInput {
            artist_id: request.artist_id,
            title: request.title,
            release_year: request.release_year,
            cover_url: request.cover_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SongRequest {
    pub artist_id: i64,
    pub album_id: Option<i64>,
    pub title: String,
    pub genre: String,
    pub duration_seconds: i32,
    pub audio_url: String,
    #[serde(default)]
    pub premium_only: bool,
}

impl From<SongRequest> for SongInput {
    fn from(request: SongRequest) -> Self {
        SongInput {
            artist_id: request.artist_id,
            album_id: request.album_id,
            title: request.title,
            genre: request.genre,
            duration_seconds: request.duration_seconds,
            audio_url: request.audio_url,
            premium_only: request.premium_only,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PlaylistRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

impl From<PlaylistRequest> for PlaylistInput {
    fn from(request: PlaylistRequest) -> Self {
        PlaylistInput {
            name: request.name,
            description: request.description,
            is_public: request.is_public,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddPlaylistSongRequest {
    pub song_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateRatingRequest {
    pub song_id: i64,
    pub value: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRatingRequest {
    pub value: i32,
}

// Query strings

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.page_size)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ArtistListQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SongListQuery {
    pub artist_id: Option<i64>,
    pub album_id: Option<i64>,
    pub genre: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl SongListQuery {
    pub fn filter(&self) -> SongFilter {
        SongFilter {
            artist_id: self.artist_id,
            album_id: self.album_id,
            genre: self.genre.clone(),
            search: self.search.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FavoriteListQuery {
    pub kind: Option<FavoriteKind>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: String,
}

// Responses

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            email_verified: user.email_verified,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

impl From<LoginResult> for AuthResponse {
    fn from(result: LoginResult) -> Self {
        AuthResponse {
            token: result.token.token,
            token_type: "Bearer",
            expires_at: result.token.expires_at,
            user: result.user.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ArtistResponse {
    pub id: i64,
    pub name: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<artist::Model> for ArtistResponse {
    fn from(artist: artist::Model) -> Self {
        ArtistResponse {
            id: artist.id,
            name: artist.name,
            bio: artist.bio,
            image_url: artist.image_url,
            created_at: artist.created_at,
            updated_at: artist.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AlbumResponse {
    pub id: i64,
    pub artist_id: i64,
    pub title: String,
    pub release_year: Option<i32>,
    pub cover_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<album::Model> for AlbumResponse {
    fn from(album: album::Model) -> Self {
        AlbumResponse {
            id: album.id,
            artist_id: album.artist_id,
            title: album.title,
            release_year: album.release_year,
            cover_url: album.cover_url,
            created_at: album.created_at,
            updated_at: album.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AlbumDetailsResponse {
    #[serde(flatten)]
    pub album: AlbumResponse,
    pub artist: ArtistResponse,
    pub songs: Vec<SongResponse>,
}

impl From<AlbumDetails> for AlbumDetailsResponse {
    fn from(details: AlbumDetails) -> Self {
        AlbumDetailsResponse {
            album: details.album.into(),
            artist: details.artist.into(),
            songs: details.songs.into_iter().map(Into::into).collect(),
        }
    }
}

/// Song metadata. The audio URL is only handed out by the stream endpoint.
#[derive(Debug, Serialize)]
pub struct SongResponse {
    pub id: i64,
    pub artist_id: i64,
    pub album_id: Option<i64>,
    pub title: String,
    pub genre: String,
    pub duration_seconds: i32,
    pub premium_only: bool,
    pub created_at: DateTime<Utc>,
}

impl From<song::Model> for SongResponse {
    fn from(song: song::Model) -> Self {
        SongResponse {
            id: song.id,
            artist_id: song.artist_id,
            album_id: song.album_id,
            title: song.title,
            genre: song.genre,
            duration_seconds: song.duration_seconds,
            premium_only: song.premium_only,
            created_at: song.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StreamResponse {
    pub song_id: i64,
    pub audio_url: String,
}

impl From<StreamInfo> for StreamResponse {
    fn from(info: StreamInfo) -> Self {
        StreamResponse {
            song_id: info.song_id,
            audio_url: info.audio_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenresResponse {
    pub genres: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PlaylistResponse {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<playlist::Model> for PlaylistResponse {
    fn from(playlist: playlist::Model) -> Self {
        PlaylistResponse {
            id: playlist.id,
            owner_id: playlist.user_id,
            name: playlist.name,
            description: playlist.description,
            is_public: playlist.is_public,
            created_at: playlist.created_at,
            updated_at: playlist.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlaylistSongResponse {
    pub position: i32,
    pub added_at: DateTime<Utc>,
    pub song: SongResponse,
}

impl From<(playlist_song::Model, song::Model)> for PlaylistSongResponse {
    fn from((entry, song): (playlist_song::Model, song::Model)) -> Self {
        PlaylistSongResponse {
            position: entry.position,
            added_at: entry.added_at,
            song: song.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlaylistDetailsResponse {
    #[serde(flatten)]
    pub playlist: PlaylistResponse,
    pub songs: Vec<PlaylistSongResponse>,
}

impl From<PlaylistDetails> for PlaylistDetailsResponse {
    fn from(details: PlaylistDetails) -> Self {
        PlaylistDetailsResponse {
            playlist: details.playlist.into(),
            songs: details.songs.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub id: i64,
    pub target: FavoriteTarget,
    pub created_at: DateTime<Utc>,
}

impl FavoriteResponse {
    pub fn new(favorite: favorite::Model, target: FavoriteTarget) -> Self {
        FavoriteResponse {
            id: favorite.id,
            target,
            created_at: favorite.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ToggleFavoriteResponse {
    pub favorited: bool,
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub id: i64,
    pub song_id: i64,
    pub value: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<rating::Model> for RatingResponse {
    fn from(rating: rating::Model) -> Self {
        RatingResponse {
            id: rating.id,
            song_id: rating.song_id,
            value: rating.value,
            created_at: rating.created_at,
            updated_at: rating.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RatingSummaryResponse {
    pub song_id: i64,
    pub average: Option<f64>,
    pub count: u64,
}

impl RatingSummaryResponse {
    pub fn new(song_id: i64, summary: RatingSummary) -> Self {
        RatingSummaryResponse {
            song_id,
            average: summary.average,
            count: summary.count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PremiumStatusResponse {
    pub active: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub amount_paid: i64,
    pub currency: Option<String>,
}

impl From<PremiumStatus> for PremiumStatusResponse {
    fn from(status: PremiumStatus) -> Self {
        PremiumStatusResponse {
            active: status.active,
            start_date: status.start_date,
            end_date: status.end_date,
            amount_paid: status.amount_paid,
            currency: status.currency,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub received: bool,
}
