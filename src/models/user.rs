// src/models/user.rs
use chrono::NaiveDateTime;
use serde::Deserialize;
use sqlx::FromRow;

/// A row of the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub college: String,
    pub password_hash: String,
    pub profile_pic: Option<String>, // relative to the static dir, e.g. "uploads/alice.png"
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    /// Field-level problems, as `(label, message)` pairs.
    pub fn validate(&self) -> Vec<(&'static str, &'static str)> {
        let mut errors = Vec::new();
        if self.username.trim().is_empty() {
            errors.push(("Username", "This field is required."));
        }
        if self.password.is_empty() {
            errors.push(("Password", "This field is required."));
        }
        errors
    }
}

pub const MIN_PASSWORD_LEN: usize = 8;

/// Signup fields as submitted. Built from a multipart body because the
/// form can carry a profile picture.
#[derive(Debug, Default, Clone)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub college: String,
    pub password1: String,
    pub password2: String,
}

impl SignupForm {
    pub fn validate(&self) -> Vec<(&'static str, &'static str)> {
        let mut errors = Vec::new();
        let required = [
            ("Username", self.username.trim()),
            ("Email", self.email.trim()),
            ("Phone", self.phone.trim()),
            ("College/Institution", self.college.trim()),
            ("Password", self.password1.as_str()),
            ("Confirm Password", self.password2.as_str()),
        ];
        for (label, value) in required {
            if value.is_empty() {
                errors.push((label, "This field is required."));
            }
        }

        let email = self.email.trim();
        if !email.is_empty() && !email.contains('@') {
            errors.push(("Email", "Invalid email address."));
        }
        if !self.password1.is_empty() && self.password1.chars().count() < MIN_PASSWORD_LEN {
            errors.push(("Password", "Password must be at least 8 characters long."));
        }
        if !self.password2.is_empty() && self.password1 != self.password2 {
            errors.push(("Confirm Password", "Passwords must match"));
        }
        errors
    }

    /// Normalised values ready for insertion.
    pub fn to_new_user(&self, password_hash: String, profile_pic: Option<String>) -> NewUser {
        NewUser {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: self.phone.trim().to_string(),
            college: self.college.trim().to_string(),
            password_hash,
            profile_pic,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub college: String,
    pub password_hash: String,
    pub profile_pic: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> SignupForm {
        SignupForm {
            username: "alice".into(),
            email: "Alice@Example.com".into(),
            phone: "555-0100".into(),
            college: "State College".into(),
            password1: "correct horse".into(),
            password2: "correct horse".into(),
        }
    }

    #[test]
    fn test_valid_signup_has_no_errors() {
        assert!(valid_form().validate().is_empty());
    }

    #[test]
    fn test_signup_requires_every_field() {
        let errors = SignupForm::default().validate();
        assert_eq!(errors.len(), 6);
        assert!(errors.iter().all(|(_, msg)| *msg == "This field is required."));
    }

    #[test]
    fn test_signup_rejects_email_without_at() {
        let form = SignupForm { email: "alice.example.com".into(), ..valid_form() };
        assert_eq!(form.validate(), vec![("Email", "Invalid email address.")]);
    }

    #[test]
    fn test_signup_rejects_short_password() {
        let form = SignupForm { password1: "short".into(), password2: "short".into(), ..valid_form() };
        assert_eq!(form.validate(), vec![("Password", "Password must be at least 8 characters long.")]);
    }

    #[test]
    fn test_signup_rejects_mismatched_passwords() {
        let form = SignupForm { password2: "different horse".into(), ..valid_form() };
        assert_eq!(form.validate(), vec![("Confirm Password", "Passwords must match")]);
    }

    #[test]
    fn test_new_user_is_normalised() {
        let form = SignupForm { username: "  alice ".into(), email: " Alice@Example.COM ".into(), ..valid_form() };
        let user = form.to_new_user("hash".into(), None);
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
    }

    #[test]
    fn test_login_form_requires_both_fields() {
        let form = LoginForm { username: "  ".into(), password: String::new() };
        assert_eq!(form.validate().len(), 2);
    }
}
