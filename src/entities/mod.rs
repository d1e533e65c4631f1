pub mod album;
pub mod artist;
pub mod email_verification;
pub mod favorite;
pub mod playlist;
pub mod playlist_song;
pub mod premium_user;
pub mod rating;
pub mod song;
pub mod user;
