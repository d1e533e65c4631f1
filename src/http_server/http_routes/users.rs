use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};

use crate::error::AppResult;
use crate::http_server::auth::{AdminUser, AuthUser};
use crate::http_server::dto::{
    ChangePasswordRequest, PageQuery, SetRoleRequest, UpdateProfileRequest, UserResponse,
};
use crate::http_server::error::{ApiJson, ApiQuery};
use crate::http_server::state::AppState;
use crate::repositories::PaginatedResult;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/me", get(me).put(update_me).delete(delete_me))
        .route("/users/me/password", put(change_password))
        .route("/users/{id}", get(get_user).delete(delete_user))
        .route("/users/{id}/role", put(set_role))
}

async fn me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service().get(user.id).await?;
    Ok(Json(user.into()))
}

async fn update_me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(request): ApiJson<UpdateProfileRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .user_service()
        .update_profile(user.id, request.into())
        .await?;
    Ok(Json(user.into()))
}

async fn delete_me(State(state): State<Arc<AppState>>, user: AuthUser) -> AppResult<StatusCode> {
    state.user_service().delete(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn change_password(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    state
        .user_service()
        .change_password(user.id, &request.current_password, &request.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> AppResult<Json<PaginatedResult<UserResponse>>> {
    let page = state.user_service().list(query.pagination()).await?;
    Ok(Json(page.map(Into::into)))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service().get(id).await?;
    Ok(Json(user.into()))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.user_service().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_role(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<SetRoleRequest>,
) -> AppResult<Json<UserResponse>> {
    tracing::info!(admin_id = admin.id, user_id = id, role = ?request.role, "Changing user role");
    let user = state.user_service().set_role(id, request.role).await?;
    Ok(Json(user.into()))
}
