use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};

use crate::error::AppResult;
use crate::http_server::auth::{AdminUser, AuthUser};
use crate::http_server::dto::{
    GenresResponse, RatingSummaryResponse, SongListQuery, SongRequest, SongResponse,
    StreamResponse,
};
use crate::http_server::error::{ApiJson, ApiQuery};
use crate::http_server::state::AppState;
use crate::repositories::{PaginatedResult, Pagination};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/songs", get(list_songs).post(create_song))
        .route("/songs/genres", get(list_genres))
        .route(
            "/songs/{id}",
            get(get_song).put(update_song).delete(delete_song),
        )
        .route("/songs/{id}/rating", get(song_rating))
        .route("/songs/{id}/stream", get(stream_song))
}

async fn list_songs(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<SongListQuery>,
) -> AppResult<Json<PaginatedResult<SongResponse>>> {
    let pagination = Pagination::new(query.page, query.page_size);
    let page = state
        .song_service()
        .list(query.filter(), pagination)
        .await?;
    Ok(Json(page.map(Into::into)))
}

async fn list_genres(State(state): State<Arc<AppState>>) -> AppResult<Json<GenresResponse>> {
    let genres = state.song_service().list_genres().await?;
    Ok(Json(GenresResponse { genres }))
}

async fn get_song(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<SongResponse>> {
    Ok(Json(state.song_service().get(id).await?.into()))
}

async fn create_song(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiJson(request): ApiJson<SongRequest>,
) -> AppResult<(StatusCode, Json<SongResponse>)> {
    let song = state.song_service().create(request.into()).await?;
    Ok((StatusCode::CREATED, Json(song.into())))
}

async fn update_song(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<SongRequest>,
) -> AppResult<Json<SongResponse>> {
    let song = state.song_service().update(id, request.into()).await?;
    Ok(Json(song.into()))
}

async fn delete_song(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.song_service().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn song_rating(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<RatingSummaryResponse>> {
    let summary = state.rating_service().song_summary(id).await?;
    Ok(Json(RatingSummaryResponse::new(id, summary)))
}

async fn stream_song(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<StreamResponse>> {
    let stream = state.song_service().stream(id, user.id).await?;
    Ok(Json(stream.into()))
}
