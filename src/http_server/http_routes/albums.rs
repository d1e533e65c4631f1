use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};

use crate::error::AppResult;
use crate::http_server::auth::AdminUser;
use crate::http_server::dto::{AlbumDetailsResponse, AlbumRequest, AlbumResponse, PageQuery};
use crate::http_server::error::{ApiJson, ApiQuery};
use crate::http_server::state::AppState;
use crate::repositories::PaginatedResult;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/albums", get(list_albums).post(create_album))
        .route(
            "/albums/{id}",
            get(get_album).put(update_album).delete(delete_album),
        )
}

async fn list_albums(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> AppResult<Json<PaginatedResult<AlbumResponse>>> {
    let page = state.album_service().list(query.pagination()).await?;
    Ok(Json(page.map(Into::into)))
}

async fn get_album(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<AlbumDetailsResponse>> {
    Ok(Json(state.album_service().get(id).await?.into()))
}

async fn create_album(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiJson(request): ApiJson<AlbumRequest>,
) -> AppResult<(StatusCode, Json<AlbumResponse>)> {
    let album = state.album_service().create(request.into()).await?;
    Ok((StatusCode::CREATED, Json(album.into())))
}

async fn update_album(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<AlbumRequest>,
) -> AppResult<Json<AlbumResponse>> {
    let album = state.album_service().update(id, request.into()).await?;
    Ok(Json(album.into()))
}

async fn delete_album(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.album_service().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
