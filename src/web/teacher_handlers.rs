// src/web/teacher_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::attendance::AttendanceStats,
    services::attendance_log,
    state::AppState,
    templates::{render, AttendanceDayPage},
    web::{context::PageContext, flash},
};
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{Html, IntoResponse},
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tower_sessions::Session;

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    date: Option<String>,
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

// GET /teacher/dashboard
pub async fn dashboard(State(state): State<AppState>, session: Session) -> AppResult<Html<String>> {
    day_page(&state, &session, Local::now().date_naive()).await
}

// GET /teacher/attendance?date=YYYY-MM-DD
pub async fn attendance_day(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<DayQuery>,
) -> AppResult<Html<String>> {
    let today = Local::now().date_naive();
    let date = match params.date.as_deref().filter(|d| !d.trim().is_empty()) {
        None => today,
        Some(raw) => match parse_day(raw) {
            Some(date) => date,
            None => {
                flash::push(&session, "warning", format!("Invalid date '{raw}', showing today.")).await?;
                today
            }
        },
    };
    day_page(&state, &session, date).await
}

async fn day_page(state: &AppState, session: &Session, date: NaiveDate) -> AppResult<Html<String>> {
    let dir = &state.config.attendance_dir;
    let records = attendance_log::read_records(&attendance_log::path_for(dir, date)).await?;
    let stats = AttendanceStats::from_records(&records);
    let days = attendance_log::list_days(dir).await?;
    tracing::debug!("Attendance for {}: {} entries", date, records.len());

    let ctx = PageContext::load(session, &state.db_pool).await;
    render(&AttendanceDayPage {
        ctx,
        date,
        is_today: date == Local::now().date_naive(),
        records: &records,
        stats: &stats,
        days: &days,
    })
}

// GET /teacher/attendance/{date}/download
pub async fn download_day(State(state): State<AppState>, Path(raw): Path<String>) -> AppResult<impl IntoResponse> {
    let date = parse_day(&raw).ok_or(AppError::NotFound)?;
    let path = attendance_log::path_for(&state.config.attendance_dir, date);
    let bytes = match tokio::fs::read(&path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(AppError::NotFound),
        Err(e) => return Err(e.into()),
    };
    let disposition = format!("attachment; filename=\"attendance_{}.csv\"", date.format("%Y-%m-%d"));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
