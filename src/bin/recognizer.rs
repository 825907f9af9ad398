// src/bin/recognizer.rs
use attendance_web::{
    api, config::RecognizerConfig, recognition::matcher::CommandMatcher, state::RecognizerState,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    attendance_web::init_tracing();
    tracing::info!("Starting recognition service...");

    let config = RecognizerConfig::from_env()?;
    config.ensure_dirs()?;
    tracing::info!(
        "Images: {}, attendance: {}, threshold: {}, matcher: {} ({}/{}/{})",
        config.images_dir.display(),
        config.attendance_dir.display(),
        config.threshold,
        config.matcher.command,
        config.matcher.model,
        config.matcher.detector,
        config.matcher.metric
    );

    let matcher = Arc::new(CommandMatcher::new(config.matcher.clone()));
    let addr = config.addr;
    let state = RecognizerState::new(config, matcher);
    let app = api::routes::create_router(state).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        tracing::error!("Failed to bind {}: {}", addr, e);
        e
    })?;
    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
