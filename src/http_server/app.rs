use std::sync::Arc;

use axum::{Router, http::HeaderValue, routing::get};
use color_eyre::eyre::{Context, Result, eyre};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::http_server::http_routes::{
    albums, artists, auth, favorites, playlists, premium, ratings, songs, users,
};
use crate::http_server::state::AppState;

async fn health() -> &'static str {
    "OK"
}

fn cors_layer(config: &ServerConfig) -> Result<CorsLayer> {
    match &config.cors_origin {
        Some(origin) => {
            let origin: HeaderValue = origin
                .parse()
                .wrap_err_with(|| eyre!("Invalid CORS origin: {origin}"))?;
            Ok(CorsLayer::new()
                .allow_origin(AllowOrigin::exact(origin))
                .allow_methods(Any)
                .allow_headers(Any))
        }
        None if cfg!(debug_assertions) => Ok(CorsLayer::permissive()),
        // Same-origin only.
        None => Ok(CorsLayer::new()),
    }
}

pub fn router(state: Arc<AppState>) -> Result<Router> {
    let api = Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(artists::router())
        .merge(albums::router())
        .merge(songs::router())
        .merge(playlists::router())
        .merge(favorites::router())
        .merge(ratings::router())
        .merge(premium::router());

    let cors = cors_layer(&state.config.server)?;

    Ok(Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}

pub async fn start(port: u16, state: Arc<AppState>) -> Result<()> {
    let app = router(state)?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .wrap_err_with(|| eyre!("Failed to bind to port {}", port))?;
    tracing::info!(port, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Failed to start HTTP server")?;

    Ok(())
}
