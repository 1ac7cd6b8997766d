use std::sync::Arc;

use axum::{
    extract::{FromRequest, FromRequestParts},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::ScoringConfig,
    db::MusicStore,
    error::AppError,
    metrics::{track_metrics, Metrics},
    middleware::{make_span_with_request_id, request_id_middleware},
};

pub mod health;
pub mod playlists;
pub mod quiz;
pub mod songs;
pub mod users;

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn MusicStore>,
    pub scoring: ScoringConfig,
    pub metrics: Metrics,
    pub version: String,
}

impl AppState {
    pub fn new(store: Arc<dyn MusicStore>, scoring: ScoringConfig, version: impl Into<String>) -> Self {
        let version = version.into();
        Self {
            store,
            scoring,
            metrics: Metrics::new(version.clone()),
            version,
        }
    }
}

/// JSON body extractor whose rejections render as `{"error": ...}`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Creates the application router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .nest("/api", api_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), track_metrics))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", post(users::create_user))
        .route("/users/:id", get(users::get_user))
        .route("/songs", get(songs::list_songs))
        .route("/songs/:id", get(songs::get_song))
        .route("/quiz/start", post(quiz::start))
        .route("/quiz/answer", post(quiz::answer))
        .route("/playlists/generate", post(playlists::generate))
        .route("/playlists", get(playlists::list).post(playlists::create))
        .route("/playlists/:id", get(playlists::detail).delete(playlists::delete))
}
