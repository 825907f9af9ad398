// src/web/page_handlers.rs
use crate::{
    error::AppResult,
    state::AppState,
    templates::{render, HomePage, MarkAttendancePage, PasswordResetPage},
    web::{context::PageContext, mw_auth::CurrentUser},
};
use axum::{
    extract::{Extension, State},
    response::{Html, IntoResponse},
};
use tower_sessions::Session;

// GET /
pub async fn home(State(state): State<AppState>, session: Session) -> AppResult<Html<String>> {
    let ctx = PageContext::load(&session, &state.db_pool).await;
    render(&HomePage { ctx })
}

// GET /password_reset
pub async fn password_reset(State(state): State<AppState>, session: Session) -> AppResult<Html<String>> {
    let ctx = PageContext::load(&session, &state.db_pool).await;
    render(&PasswordResetPage { ctx })
}

// GET|POST /mark_attendance
pub async fn mark_attendance(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    session: Session,
) -> AppResult<impl IntoResponse> {
    tracing::debug!("Capture page opened by user {}", user_id);
    let ctx = PageContext::load(&session, &state.db_pool).await;
    render(&MarkAttendancePage { ctx, recognizer_url: state.config.recognizer_url.clone() })
}
