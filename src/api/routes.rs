// src/api/routes.rs
use crate::{api::recognize_handlers, state::RecognizerState};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

pub fn create_router(state: RecognizerState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/api/recognize", post(recognize_handlers::handle_recognize))
        .route("/health", get(recognize_handlers::health))
        .layer(DefaultBodyLimit::max(body_limit))
        // The capture page is served from the web app's origin (or an ngrok URL)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
