// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{LoginForm, SignupForm},
    services::{
        auth_service,
        uploads::{allowed_image_file, remove_quietly, save_upload, secure_filename},
        user_service::{self, CreateUserError},
    },
    state::AppState,
    templates::{render, LoginPage, SignupPage, SignupValues},
    web::{
        context::PageContext,
        flash,
        mw_auth::{safe_next, SESSION_USER_KEY},
    },
};
use axum::{
    extract::{Form, Multipart, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

#[derive(Debug, Deserialize)]
pub struct NextParam {
    next: Option<String>,
}

async fn is_logged_in(session: &Session) -> bool {
    session.get::<i64>(SESSION_USER_KEY).await.ok().flatten().is_some()
}

// GET /login
pub async fn show_login_form(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<NextParam>,
) -> AppResult<Response> {
    if is_logged_in(&session).await {
        tracing::debug!("GET /login: already logged in, redirecting home");
        return Ok(Redirect::to("/").into_response());
    }
    let ctx = PageContext::load(&session, &state.db_pool).await;
    let page = LoginPage::new(ctx, String::new(), safe_next(params.next.as_deref()));
    Ok(render(&page)?.into_response())
}

// POST /login
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<NextParam>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let username = form.username.trim().to_string();
    let next = safe_next(params.next.as_deref());
    tracing::info!("Login attempt for: {}", username);

    let errors = form.validate();
    if !errors.is_empty() {
        for (label, message) in errors {
            flash::push(&session, "danger", format!("{label}: {message}")).await?;
        }
        return login_page(&state, &session, username, next).await;
    }

    let Some(user) = user_service::find_user_by_username(&state.db_pool, &username).await? else {
        tracing::debug!("Login failed: username not found: {}", username);
        flash::push(&session, "danger", "Invalid username").await?;
        return login_page(&state, &session, username, next).await;
    };

    if !auth_service::verify_password(&user.username, &form.password, &user.password_hash).await? {
        tracing::warn!("Wrong password for: {}", username);
        flash::push(&session, "danger", "Invalid password").await?;
        return login_page(&state, &session, username, next).await;
    }

    // New session id on privilege change
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::SessionError(format!("Failed to cycle id: {}", e)))?;
    session
        .insert(SESSION_USER_KEY, user.id)
        .await
        .map_err(|e| AppError::SessionError(format!("Failed to insert into session: {}", e)))?;
    flash::push(&session, "success", "Logged in successfully.").await?;

    tracing::info!("Login succeeded for: {}", user.username);
    Ok(Redirect::to(next.unwrap_or("/")).into_response())
}

async fn login_page(state: &AppState, session: &Session, username: String, next: Option<&str>) -> AppResult<Response> {
    let ctx = PageContext::load(session, &state.db_pool).await;
    Ok(render(&LoginPage::new(ctx, username, next))?.into_response())
}

// GET /signup
pub async fn show_signup_form(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    let ctx = PageContext::load(&session, &state.db_pool).await;
    let page = SignupPage { ctx, values: SignupValues::default() };
    Ok(render(&page)?.into_response())
}

/// The optional profile picture part of the signup form.
struct ProfilePic {
    file_name: String,
    bytes: Vec<u8>,
}

async fn read_signup(mut multipart: Multipart) -> AppResult<(SignupForm, Option<ProfilePic>)> {
    let mut form = SignupForm::default();
    let mut pic = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Malformed signup body: {}", e);
        AppError::InternalServerError
    })? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "profile_pic" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(|e| {
                tracing::warn!("Could not read profile picture: {}", e);
                AppError::InternalServerError
            })?;
            // Browsers send an empty part when no file was chosen
            if !file_name.is_empty() && !bytes.is_empty() {
                pic = Some(ProfilePic { file_name, bytes: bytes.to_vec() });
            }
            continue;
        }

        let value = field.text().await.unwrap_or_default();
        match name.as_str() {
            "username" => form.username = value,
            "email" => form.email = value,
            "phone" => form.phone = value,
            "college" => form.college = value,
            "password1" => form.password1 = value,
            "password2" => form.password2 = value,
            _ => {}
        }
    }
    Ok((form, pic))
}

// POST /signup
pub async fn handle_signup(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> AppResult<Response> {
    let (form, pic) = read_signup(multipart).await?;
    let values = SignupValues {
        username: form.username.trim().to_string(),
        email: form.email.trim().to_string(),
        phone: form.phone.trim().to_string(),
        college: form.college.trim().to_string(),
    };

    let mut errors: Vec<String> = form
        .validate()
        .into_iter()
        .map(|(label, message)| format!("{label}: {message}"))
        .collect();
    let pic_name = pic.as_ref().map(|p| secure_filename(&p.file_name));
    if let Some(name) = &pic_name {
        if name.is_empty() || !allowed_image_file(name) {
            errors.push("Profile Picture: File type not allowed".to_string());
        }
    }
    if !errors.is_empty() {
        for message in errors {
            flash::push(&session, "danger", message).await?;
        }
        return signup_page(&state, &session, values).await;
    }

    let new_username = form.username.trim();
    let new_email = form.email.trim().to_lowercase();
    if user_service::find_user_by_username(&state.db_pool, new_username).await?.is_some() {
        flash::push(&session, "danger", "Username already exists. Choose a different one.").await?;
        return signup_page(&state, &session, values).await;
    }
    if user_service::find_user_by_email(&state.db_pool, &new_email).await?.is_some() {
        flash::push(&session, "danger", "Email already registered. Use a different one.").await?;
        return signup_page(&state, &session, values).await;
    }

    let password_hash = auth_service::hash_password(&form.password1).await?;

    let mut saved_pic = None;
    if let (Some(pic), Some(name)) = (pic, pic_name) {
        let stored_name = format!("{}_{}", uuid::Uuid::new_v4().simple(), name);
        let path = save_upload(&state.config.upload_dir, &stored_name, &pic.bytes).await?;
        saved_pic = Some((path, format!("uploads/{stored_name}")));
    }

    let new_user = form.to_new_user(password_hash, saved_pic.as_ref().map(|(_, rel)| rel.clone()));
    let taken_message = match user_service::create_user(&state.db_pool, &new_user).await {
        Ok(_) => None,
        Err(CreateUserError::UsernameTaken) => Some("Username already exists. Choose a different one."),
        Err(CreateUserError::EmailTaken) => Some("Email already registered. Use a different one."),
        Err(CreateUserError::Other(e)) => {
            if let Some((path, _)) = &saved_pic {
                remove_quietly(path).await;
            }
            return Err(e);
        }
    };
    if let Some(message) = taken_message {
        if let Some((path, _)) = &saved_pic {
            remove_quietly(path).await;
        }
        flash::push(&session, "danger", message).await?;
        return signup_page(&state, &session, values).await;
    }

    flash::push(&session, "success", "Account created successfully! Please login.").await?;
    Ok(Redirect::to("/login").into_response())
}

async fn signup_page(state: &AppState, session: &Session, values: SignupValues) -> AppResult<Response> {
    let ctx = PageContext::load(session, &state.db_pool).await;
    Ok(render(&SignupPage { ctx, values })?.into_response())
}

// GET /logout
pub async fn handle_logout(session: Session) -> AppResult<Redirect> {
    let user_id: Option<i64> = session
        .remove(SESSION_USER_KEY)
        .await
        .map_err(|e| AppError::SessionError(format!("Failed to clear session: {}", e)))?;
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::SessionError(format!("Failed to cycle id: {}", e)))?;

    match user_id {
        Some(id) => tracing::info!("User {} logged out.", id),
        None => tracing::info!("Anonymous session logged out."),
    }
    flash::push(&session, "success", "You have been logged out successfully.").await?;
    Ok(Redirect::to("/"))
}
