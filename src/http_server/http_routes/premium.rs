use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
};

use crate::error::AppResult;
use crate::http_server::auth::AuthUser;
use crate::http_server::dto::{PremiumStatusResponse, WebhookResponse};
use crate::http_server::state::AppState;

const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/premium/status", get(premium_status))
        .route("/webhooks/stripe", post(stripe_webhook))
}

async fn premium_status(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> AppResult<Json<PremiumStatusResponse>> {
    let status = state.premium_service().status(user.id).await?;
    Ok(Json(status.into()))
}

/// Signed by Stripe rather than by a user token. The raw body is needed for the signature.
async fn stripe_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookResponse>> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let outcome = state
        .premium_service()
        .handle_stripe_webhook(&body, signature)
        .await?;
    tracing::debug!(?outcome, "Stripe webhook handled");

    Ok(Json(WebhookResponse { received: true }))
}
