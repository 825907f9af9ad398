// src/web/mw_auth.rs
use crate::{error::AppError, web::flash};
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

pub const SESSION_USER_KEY: &str = "user_id";

/// Id of the logged in user, put in the request extensions by `require_auth`.
#[derive(Clone, Copy, Debug)]
pub struct CurrentUser(pub i64);

/// Lets the request through only with a logged in session; otherwise
/// redirects to `/login?next=<original path>`.
pub async fn require_auth(session: Session, mut request: Request, next: Next) -> Result<Response, AppError> {
    match session.get::<i64>(SESSION_USER_KEY).await {
        Ok(Some(user_id)) => {
            tracing::debug!("Auth MW: user {} authenticated", user_id);
            request.extensions_mut().insert(CurrentUser(user_id));
            Ok(next.run(request).await)
        }
        Ok(None) => {
            let target = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| "/".to_string());
            tracing::debug!("Auth MW: not logged in, redirecting to /login (next={})", target);
            flash::push(&session, "info", "Please log in to access this page.").await?;
            Ok(Redirect::to(&format!("/login?next={}", urlencoding::encode(&target))).into_response())
        }
        Err(e) => {
            tracing::error!("Auth MW: failed to read session: {:?}", e);
            Err(AppError::SessionError(format!("Failed to check session: {}", e)))
        }
    }
}

/// Only same-site paths are followed after login.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.starts_with("/\\"))
}
