use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};

use crate::error::AppResult;
use crate::http_server::auth::AdminUser;
use crate::http_server::dto::{
    AlbumResponse, ArtistListQuery, ArtistRequest, ArtistResponse, SongResponse,
};
use crate::http_server::error::{ApiJson, ApiQuery};
use crate::http_server::state::AppState;
use crate::repositories::{PaginatedResult, Pagination};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/artists", get(list_artists).post(create_artist))
        .route(
            "/artists/{id}",
            get(get_artist).put(update_artist).delete(delete_artist),
        )
        .route("/artists/{id}/albums", get(artist_albums))
        .route("/artists/{id}/songs", get(artist_songs))
}

async fn list_artists(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<ArtistListQuery>,
) -> AppResult<Json<PaginatedResult<ArtistResponse>>> {
    let pagination = Pagination::new(query.page, query.page_size);
    let page = state
        .artist_service()
        .list(query.search.as_deref(), pagination)
        .await?;
    Ok(Json(page.map(Into::into)))
}

async fn get_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<ArtistResponse>> {
    Ok(Json(state.artist_service().get(id).await?.into()))
}

async fn create_artist(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiJson(request): ApiJson<ArtistRequest>,
) -> AppResult<(StatusCode, Json<ArtistResponse>)> {
    let artist = state.artist_service().create(request.into()).await?;
    Ok((StatusCode::CREATED, Json(artist.into())))
}

async fn update_artist(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<ArtistRequest>,
) -> AppResult<Json<ArtistResponse>> {
    let artist = state.artist_service().update(id, request.into()).await?;
    Ok(Json(artist.into()))
}

async fn delete_artist(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.artist_service().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn artist_albums(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<AlbumResponse>>> {
    let albums = state.album_service().list_by_artist(id).await?;
    Ok(Json(albums.into_iter().map(Into::into).collect()))
}

async fn artist_songs(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<SongResponse>>> {
    let songs = state.artist_service().songs(id).await?;
    Ok(Json(songs.into_iter().map(Into::into).collect()))
}
