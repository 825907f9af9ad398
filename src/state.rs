// src/state.rs
use crate::{
    config::{RecognizerConfig, WebConfig},
    recognition::{matcher::FaceMatcher, Recognizer},
    services::attendance_log::AttendanceLog,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// State of the user-facing site.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: Arc<WebConfig>,
}

// Lets handlers extract the pool directly
impl axum::extract::FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> SqlitePool {
        state.db_pool.clone()
    }
}

/// State of the recognition service.
#[derive(Clone)]
pub struct RecognizerState {
    pub config: Arc<RecognizerConfig>,
    pub matcher: Arc<dyn FaceMatcher>,
    pub log: Arc<AttendanceLog>,
}

impl RecognizerState {
    pub fn new(config: RecognizerConfig, matcher: Arc<dyn FaceMatcher>) -> Self {
        let log = AttendanceLog::new(config.attendance_dir.clone(), config.dedup_window);
        Self { config: Arc::new(config), matcher, log: Arc::new(log) }
    }

    pub fn recognizer(&self) -> Recognizer<'_> {
        Recognizer {
            matcher: self.matcher.as_ref(),
            log: &self.log,
            images_dir: &self.config.images_dir,
            threshold: self.config.threshold,
        }
    }
}
