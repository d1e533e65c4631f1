use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};

use crate::error::AppResult;
use crate::http_server::auth::AuthUser;
use crate::http_server::dto::{CreateRatingRequest, RatingResponse, UpdateRatingRequest};
use crate::http_server::error::ApiJson;
use crate::http_server::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ratings", get(my_ratings).post(rate_song))
        .route("/ratings/{id}", put(update_rating).delete(delete_rating))
}

async fn my_ratings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> AppResult<Json<Vec<RatingResponse>>> {
    let ratings = state.rating_service().list_for_user(user.id).await?;
    Ok(Json(ratings.into_iter().map(Into::into).collect()))
}

async fn rate_song(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(request): ApiJson<CreateRatingRequest>,
) -> AppResult<(StatusCode, Json<RatingResponse>)> {
    let rating = state
        .rating_service()
        .rate(user.id, request.song_id, request.value)
        .await?;
    Ok((StatusCode::CREATED, Json(rating.into())))
}

async fn update_rating(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<UpdateRatingRequest>,
) -> AppResult<Json<RatingResponse>> {
    let rating = state
        .rating_service()
        .update(user.id, id, request.value)
        .await?;
    Ok(Json(rating.into()))
}

async fn delete_rating(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.rating_service().delete(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
