//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the questionnaire API gateway.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// The service rejected the bearer token (HTTP 401). The local session has
    /// already been cleared when this is returned.
    #[error("not authorized")]
    Unauthorized,
    #[error("questionnaire service responded with status {0}")]
    Status(reqwest::StatusCode),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Url(#[from] url::ParseError),
    #[error("unexpected response from questionnaire service: {0}")]
    Decode(String),
}

impl ApiError {
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Errors emitted by `SessionStore`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AuthService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    /// The service refused the request and explained why.
    #[error("{0}")]
    Rejected(String),
    #[error("authentication service responded with status {0}")]
    Status(reqwest::StatusCode),
    #[error("authentication response did not include a token")]
    MissingToken,
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Errors emitted by `NavigationController`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NavigationError {
    #[error("no authenticated session")]
    Unauthenticated,
    #[error("no question is currently shown")]
    NoCurrentQuestion,
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl NavigationError {
    /// True when the caller should send the user back to the login screen.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        match self {
            Self::Unauthenticated => true,
            Self::Api(err) => err.is_unauthorized(),
            Self::NoCurrentQuestion => false,
        }
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_authorization_failures_require_login() {
        assert!(NavigationError::Unauthenticated.requires_login());
        assert!(NavigationError::Api(ApiError::Unauthorized).requires_login());
        assert!(
            !NavigationError::Api(ApiError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR))
                .requires_login()
        );
        assert!(!NavigationError::NoCurrentQuestion.requires_login());
    }
}
