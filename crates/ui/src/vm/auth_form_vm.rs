//! Presentation-layer checks for the login and registration forms.

use std::sync::LazyLock;

use regex::Regex;

pub const MIN_PASSWORD_LENGTH: usize = 8;

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

fn looks_like_email(email: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(email))
}

fn check_email(email: &str) -> Option<&'static str> {
    let email = email.trim();
    if email.is_empty() {
        Some("Email is required")
    } else if !looks_like_email(email) {
        Some("Invalid email address")
    } else {
        None
    }
}

/// Per-field messages; `None` means the field is fine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub name: Option<&'static str>,
    pub email: Option<&'static str>,
    pub password: Option<&'static str>,
    pub confirmation: Option<&'static str>,
}

impl FieldErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.confirmation.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns the per-field messages when any field is invalid.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let errors = FieldErrors {
            email: check_email(&self.email),
            password: self.password.is_empty().then_some("Password is required"),
            ..FieldErrors::default()
        };
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirmation: String,
}

impl RegisterForm {
    /// # Errors
    ///
    /// Returns the per-field messages when any field is invalid.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let password = if self.password.is_empty() {
            Some("Password is required")
        } else if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            Some("Password must be at least 8 characters")
        } else {
            None
        };
        let confirmation = if self.confirmation.is_empty() {
            Some("Password confirmation is required")
        } else if self.confirmation != self.password {
            Some("Passwords must match")
        } else {
            None
        };

        let errors = FieldErrors {
            name: self.name.trim().is_empty().then_some("Name is required"),
            email: check_email(&self.email),
            password,
            confirmation,
        };
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
