use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};

use crate::error::AppResult;
use crate::http_server::auth::AuthUser;
use crate::http_server::dto::{
    AddPlaylistSongRequest, PageQuery, PlaylistDetailsResponse, PlaylistRequest,
    PlaylistResponse, PlaylistSongResponse,
};
use crate::http_server::error::{ApiJson, ApiQuery};
use crate::http_server::state::AppState;
use crate::repositories::PaginatedResult;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/playlists", get(my_playlists).post(create_playlist))
        .route("/playlists/public", get(public_playlists))
        .route(
            "/playlists/{id}",
            get(get_playlist).put(update_playlist).delete(delete_playlist),
        )
        .route(
            "/playlists/{id}/songs",
            get(playlist_songs).post(add_playlist_song),
        )
        .route(
            "/playlists/{id}/songs/{song_id}",
            delete(remove_playlist_song),
        )
}

async fn my_playlists(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> AppResult<Json<Vec<PlaylistResponse>>> {
    let playlists = state.playlist_service().list_for_user(user.id).await?;
    Ok(Json(playlists.into_iter().map(Into::into).collect()))
}

async fn public_playlists(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> AppResult<Json<PaginatedResult<PlaylistResponse>>> {
    let page = state
        .playlist_service()
        .list_public(query.pagination())
        .await?;
    Ok(Json(page.map(Into::into)))
}

async fn create_playlist(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(request): ApiJson<PlaylistRequest>,
) -> AppResult<(StatusCode, Json<PlaylistResponse>)> {
    let playlist = state
        .playlist_service()
        .create(user.id, request.into())
        .await?;
    Ok((StatusCode::CREATED, Json(playlist.into())))
}

async fn get_playlist(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<PlaylistDetailsResponse>> {
    let details = state.playlist_service().get(id, user.id).await?;
    Ok(Json(details.into()))
}

async fn update_playlist(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<PlaylistRequest>,
) -> AppResult<Json<PlaylistResponse>> {
    let playlist = state
        .playlist_service()
        .update(id, user.id, request.into())
        .await?;
    Ok(Json(playlist.into()))
}

async fn delete_playlist(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.playlist_service().delete(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn playlist_songs(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<PlaylistSongResponse>>> {
    let songs = state.playlist_service().list_songs(id, user.id).await?;
    Ok(Json(songs.into_iter().map(Into::into).collect()))
}

async fn add_playlist_song(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<AddPlaylistSongRequest>,
) -> AppResult<StatusCode> {
    state
        .playlist_service()
        .add_song(id, user.id, request.song_id)
        .await?;
    Ok(StatusCode::CREATED)
}

async fn remove_playlist_song(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((id, song_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state
        .playlist_service()
        .remove_song(id, user.id, song_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
