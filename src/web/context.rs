// src/web/context.rs
use crate::{
    services::user_service,
    web::{flash::{self, Flash}, mw_auth::SESSION_USER_KEY},
};
use sqlx::SqlitePool;
use tower_sessions::Session;

/// What the base layout needs on every page.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub flashes: Vec<Flash>,
    pub username: Option<String>,
}

impl PageContext {
    /// Drains the flashes and looks up who is logged in, if anyone.
    pub async fn load(session: &Session, db_pool: &SqlitePool) -> Self {
        let flashes = flash::take(session).await;
        let user_id = session.get::<i64>(SESSION_USER_KEY).await.ok().flatten();
        let username = match user_id {
            Some(id) => user_service::find_user_by_id(db_pool, id)
                .await
                .ok()
                .flatten()
                .map(|u| u.username),
            None => None,
        };
        Self { flashes, username }
    }
}
