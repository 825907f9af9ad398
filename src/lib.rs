// src/lib.rs
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod recognition;
pub mod services;
pub mod state;
pub mod templates;
pub mod tunnel;
pub mod web;

/// Installs the tracing subscriber shared by all binaries.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "attendance_web=debug,recognizer=debug,tunnel_publisher=info,tower_http=info,sqlx=warn,tower_sessions=info".into()
        }))
        .with(fmt::layer())
        .init();
}
