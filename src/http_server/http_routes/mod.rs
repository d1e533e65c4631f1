pub mod albums;
pub mod artists;
pub mod auth;
pub mod favorites;
pub mod playlists;
pub mod premium;
pub mod ratings;
pub mod songs;
pub mod users;
