// src/templates.rs
use crate::{
    error::AppResult,
    models::attendance::{AttendanceRecord, AttendanceStats},
    web::context::PageContext,
};
use askama::Template;
use axum::response::Html;
use chrono::NaiveDate;

/// Renders any page into an HTML response.
pub fn render<T: Template>(template: &T) -> AppResult<Html<String>> {
    Ok(Html(template.render()?))
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage {
    pub ctx: PageContext,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub ctx: PageContext,
    pub username: String, // refilled after a failed attempt
    pub next_query: String, // "" or "?next=<encoded path>"
}

impl LoginPage {
    pub fn new(ctx: PageContext, username: String, next: Option<&str>) -> Self {
        let next_query = next
            .map(|n| format!("?next={}", urlencoding::encode(n)))
            .unwrap_or_default();
        Self { ctx, username, next_query }
    }
}

/// Values echoed back into the signup form. Passwords never are.
#[derive(Debug, Clone, Default)]
pub struct SignupValues {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub college: String,
}

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupPage {
    pub ctx: PageContext,
    pub values: SignupValues,
}

#[derive(Template)]
#[template(path = "password_reset.html")]
pub struct PasswordResetPage {
    pub ctx: PageContext,
}

#[derive(Template)]
#[template(path = "main.html")]
pub struct MarkAttendancePage {
    pub ctx: PageContext,
    pub recognizer_url: String,
}

#[derive(Template)]
#[template(path = "teacher_attendance.html")]
pub struct AttendanceDayPage<'a> {
    pub ctx: PageContext,
    pub date: NaiveDate,
    pub is_today: bool,
    pub records: &'a [AttendanceRecord],
    pub stats: &'a AttendanceStats,
    pub days: &'a [NaiveDate],
}

impl AttendanceDayPage<'_> {
    pub fn date_param(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}
