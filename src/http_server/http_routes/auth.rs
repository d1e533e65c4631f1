use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};

use crate::error::AppResult;
use crate::http_server::dto::{
    AuthResponse, LoginRequest, MessageResponse, RegisterRequest, ResendVerificationRequest,
    UserResponse, VerifyEmailQuery, VerifyEmailRequest,
};
use crate::http_server::error::{ApiJson, ApiQuery};
use crate::http_server::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route(
            "/auth/verify-email",
            post(verify_email).get(verify_email_link),
        )
        .route("/auth/resend-verification", post(resend_verification))
}

async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .auth_service()
        .register(&request.username, &request.email, &request.password)
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let result = state
        .auth_service()
        .login(&request.email, &request.password)
        .await?;
    Ok(Json(result.into()))
}

async fn verify_email(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<VerifyEmailRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state.auth_service().verify_email(&request.token).await?;
    Ok(Json(user.into()))
}

/// Target of the link sent in verification mail.
async fn verify_email_link(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<VerifyEmailQuery>,
) -> AppResult<Json<UserResponse>> {
    let user = state.auth_service().verify_email(&query.token).await?;
    Ok(Json(user.into()))
}

async fn resend_verification(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<ResendVerificationRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    state
        .auth_service()
        .resend_verification(&request.email)
        .await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: "Verification email sent",
        }),
    ))
}
