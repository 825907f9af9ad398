// src/web/flash.rs
//! One-shot messages carried in the session to the next rendered page.
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

const FLASH_KEY: &str = "_flashes";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    pub category: String, // success | danger | info | warning
    pub message: String,
}

pub async fn push(session: &Session, category: &str, message: impl Into<String>) -> AppResult<()> {
    let mut flashes: Vec<Flash> = session
        .get(FLASH_KEY)
        .await
        .map_err(|e| AppError::SessionError(format!("Failed to read flashes: {}", e)))?
        .unwrap_or_default();
    flashes.push(Flash { category: category.to_string(), message: message.into() });
    session
        .insert(FLASH_KEY, flashes)
        .await
        .map_err(|e| AppError::SessionError(format!("Failed to store flash: {}", e)))
}

/// Removes and returns pending flashes. A broken session just shows none.
pub async fn take(session: &Session) -> Vec<Flash> {
    match session.remove::<Vec<Flash>>(FLASH_KEY).await {
        Ok(flashes) => flashes.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Could not read flashes from session: {}", e);
            Vec::new()
        }
    }
}
