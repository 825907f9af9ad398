// src/services/user_service.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{NewUser, User},
};
use sqlx::SqlitePool;

const USER_COLUMNS: &str = "id, username, email, phone, college, password_hash, profile_pic, created_at";

pub async fn find_user_by_username(db_pool: &SqlitePool, username: &str) -> AppResult<Option<User>> {
    tracing::debug!("Looking up user by username: {}", username);
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"))
        .bind(username)
        .fetch_optional(db_pool)
        .await?;
    Ok(user)
}

pub async fn find_user_by_email(db_pool: &SqlitePool, email: &str) -> AppResult<Option<User>> {
    tracing::debug!("Looking up user by email: {}", email);
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"))
        .bind(email)
        .fetch_optional(db_pool)
        .await?;
    Ok(user)
}

pub async fn find_user_by_id(db_pool: &SqlitePool, user_id: i64) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))
        .bind(user_id)
        .fetch_optional(db_pool)
        .await?;
    Ok(user)
}

/// Why a signup could not be stored.
#[derive(Debug)]
pub enum CreateUserError {
    UsernameTaken,
    EmailTaken,
    Other(AppError),
}

impl From<sqlx::Error> for CreateUserError {
    fn from(e: sqlx::Error) -> Self {
        CreateUserError::Other(e.into())
    }
}

/// Inserts a user and returns its id.
///
/// The pre-insert lookups give the friendly messages; the UNIQUE
/// constraints still decide when two signups race.
pub async fn create_user(db_pool: &SqlitePool, new_user: &NewUser) -> Result<i64, CreateUserError> {
    tracing::info!("Creating user: {}", new_user.username);

    let result = sqlx::query(
        r#"
        INSERT INTO users (username, email, phone, college, password_hash, profile_pic)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&new_user.username)
    .bind(&new_user.email)
    .bind(&new_user.phone)
    .bind(&new_user.college)
    .bind(&new_user.password_hash)
    .bind(&new_user.profile_pic)
    .execute(db_pool)
    .await;

    match result {
        Ok(done) => {
            let id = done.last_insert_rowid();
            tracing::info!("User '{}' created with id {}.", new_user.username, id);
            Ok(id)
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            // SQLite names the offending column: "UNIQUE constraint failed: users.email"
            let message = db_err.message().to_string();
            tracing::warn!("Signup for '{}' hit a unique constraint: {}", new_user.username, message);
            if message.contains("users.email") {
                Err(CreateUserError::EmailTaken)
            } else {
                Err(CreateUserError::UsernameTaken)
            }
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.into(),
            email: email.into(),
            phone: "555-0100".into(),
            college: "State College".into(),
            password_hash: "hash".into(),
            profile_pic: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let pool = test_pool().await;
        let id = create_user(&pool, &new_user("alice", "alice@example.com")).await.unwrap();

        let by_name = find_user_by_username(&pool, "alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, id);
        assert_eq!(by_name.college, "State College");

        let by_email = find_user_by_email(&pool, "alice@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.username, "alice");

        assert!(find_user_by_id(&pool, id).await.unwrap().is_some());
        assert!(find_user_by_username(&pool, "nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_reported() {
        let pool = test_pool().await;
        create_user(&pool, &new_user("alice", "alice@example.com")).await.unwrap();
        let err = create_user(&pool, &new_user("alice", "other@example.com")).await.unwrap_err();
        assert!(matches!(err, CreateUserError::UsernameTaken));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_reported() {
        let pool = test_pool().await;
        create_user(&pool, &new_user("alice", "alice@example.com")).await.unwrap();
        let err = create_user(&pool, &new_user("bob", "alice@example.com")).await.unwrap_err();
        assert!(matches!(err, CreateUserError::EmailTaken));
    }
}
