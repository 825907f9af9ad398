// src/web/routes.rs
use crate::{
    state::AppState,
    web::{auth_handlers, mw_auth, page_handlers, teacher_handlers},
};
use axum::{middleware, routing::get, Router};
use tower_http::services::ServeDir;

pub fn create_router(app_state: AppState) -> Router {
    // --- Public routes ---
    let public_routes = Router::new()
        .route("/", get(page_handlers::home))
        .route("/login", get(auth_handlers::show_login_form).post(auth_handlers::handle_login))
        .route("/signup", get(auth_handlers::show_signup_form).post(auth_handlers::handle_signup))
        .route("/password_reset", get(page_handlers::password_reset));

    // --- Teacher dashboard, nested under /teacher ---
    let teacher_routes = Router::new()
        .route("/dashboard", get(teacher_handlers::dashboard))
        .route("/attendance", get(teacher_handlers::attendance_day))
        .route("/attendance/{date}/download", get(teacher_handlers::download_day));

    // --- Routes that need a login ---
    let authenticated_routes = Router::new()
        .route("/logout", get(auth_handlers::handle_logout))
        .route(
            "/mark_attendance",
            get(page_handlers::mark_attendance).post(page_handlers::mark_attendance),
        )
        .nest("/teacher", teacher_routes)
        .route_layer(middleware::from_fn(mw_auth::require_auth));

    let static_files = ServeDir::new(&app_state.config.static_dir);
    let uploads = ServeDir::new(&app_state.config.upload_dir);

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .nest_service("/static", static_files)
        .nest_service("/uploads", uploads)
        .with_state(app_state)
}
