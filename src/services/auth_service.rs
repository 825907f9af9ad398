// src/services/auth_service.rs
use crate::error::{AppError, AppResult};

/// Checks a submitted password against the stored value.
///
/// Stored values are bcrypt hashes. Rows written before hashing was
/// introduced hold the plaintext password; those still match, with a
/// warning so they can be migrated.
pub async fn verify_password(username: &str, password: &str, stored_hash: &str) -> AppResult<bool> {
    let password_owned = password.to_string();
    let stored_owned = stored_hash.to_string();
    let verified = tokio::task::spawn_blocking(move || {
        tracing::debug!("Verifying bcrypt hash...");
        bcrypt::verify(&password_owned, &stored_owned)
    })
    .await
    .map_err(|e| {
        tracing::error!("spawn_blocking task failed (verify_password): {:?}", e);
        AppError::InternalServerError
    })?;

    let valid = match verified {
        Ok(valid) => valid,
        Err(e) => {
            // Not a bcrypt hash at all
            tracing::debug!("bcrypt verify error: {}", e);
            false
        }
    };

    if !valid && stored_hash == password {
        tracing::warn!("Legacy plaintext password used for user {}, migrate to a hashed password.", username);
        return Ok(true);
    }
    Ok(valid)
}

/// Produces a bcrypt hash for a password.
pub async fn hash_password(password: &str) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Generating bcrypt hash...");
        bcrypt::hash(&password, bcrypt::DEFAULT_COST)
    })
    .await
    .map_err(|e| {
        tracing::error!("spawn_blocking task failed (hash_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("bcrypt failed to hash password: {:?}", e);
        AppError::PasswordHashingError
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hash = hash_password("s3cret-pass").await.unwrap();
        assert_ne!(hash, "s3cret-pass");
        assert!(verify_password("alice", "s3cret-pass", &hash).await.unwrap());
        assert!(!verify_password("alice", "wrong-pass", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_legacy_plaintext_still_matches() {
        assert!(verify_password("bob", "plain-old", "plain-old").await.unwrap());
        assert!(!verify_password("bob", "guess", "plain-old").await.unwrap());
    }
}
