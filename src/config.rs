// src/config.rs
use crate::error::{AppError, AppResult};
use std::{env, fmt::Display, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

/// Settings for the user-facing site.
#[derive(Debug, Clone)]
pub struct WebConfig {
    pub database_url: String,
    pub session_secret: String,
    pub addr: SocketAddr,
    pub upload_dir: PathBuf,
    pub static_dir: PathBuf,
    pub attendance_dir: PathBuf,
    // Base URL the capture page posts frames to
    pub recognizer_url: String,
}

impl WebConfig {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let session_secret = env::var("SESSION_SECRET")?;
        if session_secret.len() < 64 {
            return Err(AppError::Config("SESSION_SECRET must be at least 64 bytes".to_string()));
        }

        Ok(Self {
            database_url: try_load("DATABASE_URL", "sqlite://site.db")?,
            session_secret,
            addr: try_load("WEB_ADDR", "0.0.0.0:5000")?,
            upload_dir: try_load("UPLOAD_DIR", "static/uploads")?,
            static_dir: try_load("STATIC_DIR", "static")?,
            attendance_dir: try_load("ATTENDANCE_DIR", "backend/attendance")?,
            recognizer_url: try_load("RECOGNIZER_URL", "http://127.0.0.1:5008")?,
        })
    }
}

/// Settings for the recognition service.
#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    pub addr: SocketAddr,
    pub images_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub attendance_dir: PathBuf,
    /// A best candidate at or below this distance counts as a match.
    pub threshold: f64,
    pub dedup_window: Duration,
    pub max_upload_bytes: usize,
    pub matcher: MatcherConfig,
}

#[derive(Debug, Clone)]
pub struct MatcherConfig {
    pub command: String,
    pub model: String,
    pub detector: String,
    pub metric: String,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            command: "deepface-find".to_string(),
            model: "ArcFace".to_string(),
            detector: "opencv".to_string(),
            metric: "cosine".to_string(),
        }
    }
}

impl RecognizerConfig {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let threshold: f64 = try_load("MATCH_THRESHOLD", "0.6")?;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(AppError::Config(format!("MATCH_THRESHOLD must be a non-negative number, got {threshold}")));
        }
        let window_secs: u64 = try_load("DEDUP_WINDOW_SECS", "3600")?;

        Ok(Self {
            addr: try_load("RECOGNIZER_ADDR", "0.0.0.0:5008")?,
            images_dir: try_load("IMAGES_DIR", "backend/images")?,
            uploads_dir: try_load("UPLOADS_DIR", "backend/uploads")?,
            attendance_dir: try_load("ATTENDANCE_DIR", "backend/attendance")?,
            threshold,
            dedup_window: Duration::from_secs(window_secs),
            max_upload_bytes: try_load("MAX_UPLOAD_BYTES", "10485760")?,
            matcher: MatcherConfig {
                command: try_load("MATCHER_COMMAND", "deepface-find")?,
                model: try_load("MATCHER_MODEL", "ArcFace")?,
                detector: try_load("MATCHER_DETECTOR", "opencv")?,
                metric: try_load("MATCHER_METRIC", "cosine")?,
            },
        })
    }

    /// Creates the image, upload and attendance folders if they are missing.
    pub fn ensure_dirs(&self) -> AppResult<()> {
        for dir in [&self.images_dir, &self.uploads_dir, &self.attendance_dir] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

/// Settings for the one-shot ngrok URL publisher.
#[derive(Debug, Clone)]
pub struct TunnelConfig {
    pub api_url: String,
    pub output_file: PathBuf,
    pub backend_port: String,
    pub frontend_port: String,
}

impl TunnelConfig {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Ok(Self {
            api_url: try_load("NGROK_API", "http://127.0.0.1:4040/api/tunnels")?,
            output_file: try_load("NGROK_OUTPUT_FILE", "static/ngrok_url.json")?,
            backend_port: try_load("BACKEND_PORT", "5008")?,
            frontend_port: try_load("FRONTEND_PORT", "5000")?,
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> AppResult<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        tracing::info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse()
        .map_err(|e| AppError::Config(format!("invalid {key} value {raw:?}: {e}")))
}
