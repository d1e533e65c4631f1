use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};

use crate::entities::favorite::FavoriteTarget;
use crate::error::AppResult;
use crate::http_server::auth::AuthUser;
use crate::http_server::dto::{FavoriteListQuery, FavoriteResponse, ToggleFavoriteResponse};
use crate::http_server::error::{ApiJson, ApiQuery};
use crate::http_server::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/favorites", get(list_favorites).post(add_favorite))
        .route("/favorites/toggle", post(toggle_favorite))
        .route("/favorites/{id}", delete(remove_favorite))
}

async fn list_favorites(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<FavoriteListQuery>,
) -> AppResult<Json<Vec<FavoriteResponse>>> {
    let favorites = state.favorite_service().list(user.id, query.kind).await?;
    Ok(Json(
        favorites
            .into_iter()
            .map(|(favorite, target)| FavoriteResponse::new(favorite, target))
            .collect(),
    ))
}

/// Body is the target itself, e.g. `{"kind": "song", "id": 3}`.
async fn add_favorite(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(target): ApiJson<FavoriteTarget>,
) -> AppResult<(StatusCode, Json<FavoriteResponse>)> {
    let favorite = state.favorite_service().add(user.id, target).await?;
    Ok((
        StatusCode::CREATED,
        Json(FavoriteResponse::new(favorite, target)),
    ))
}

async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(target): ApiJson<FavoriteTarget>,
) -> AppResult<Json<ToggleFavoriteResponse>> {
    let favorited = state.favorite_service().toggle(user.id, target).await?;
    Ok(Json(ToggleFavoriteResponse { favorited }))
}

async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.favorite_service().remove(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
