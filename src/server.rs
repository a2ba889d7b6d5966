use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::provider::MovieProvider;
use crate::tmdb::TmdbClient;

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn MovieProvider>,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: Option<String>,
}

pub async fn run_server(config: Config) -> Result<()> {
    let provider: Arc<dyn MovieProvider> = Arc::new(TmdbClient::from_config(&config)?);
    info!("Proxying TMDB at {}", config.tmdb_base_url);

    let app = build_router(AppState { provider });

    info!("Listening on {}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/search", get(search))
        .route("/api/movie/:id", get(movie_details))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let Some(query) = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
    else {
        return error_response(StatusCode::BAD_REQUEST, "Search query is required");
    };

    match state.provider.search_movies(query).await {
        Ok(page) => Json(page).into_response(),
        Err(e) => {
            error!("Search API error: {:#}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to search movies")
        }
    }
}

async fn movie_details(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(id) = id.trim().parse::<i64>().ok().filter(|id| *id > 0) else {
        return error_response(StatusCode::BAD_REQUEST, "Movie ID is required");
    };

    match state.provider.movie_details(id).await {
        Ok(detail) => Json(detail).into_response(),
        Err(e) => {
            error!("Movie details API error: {:#}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch movie details",
            )
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
