//! Login, registration and logout against the questionnaire service.

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::error::AuthError;
use crate::session::{Session, SessionStore, SessionToken};

/// Result of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The service issued a token right away.
    SignedIn(Session),
    /// The account exists; the user still has to log in.
    LoginRequired,
}

#[derive(Clone)]
pub struct AuthService {
    client: Client,
    config: ClientConfig,
    session: Arc<SessionStore>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Token-bearing response. Both field names are in use by the service.
#[derive(Debug, Default, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token: Option<String>,
}

impl TokenResponse {
    fn into_token(self) -> Option<SessionToken> {
        self.access_token
            .or(self.token)
            .filter(|token| !token.trim().is_empty())
            .map(SessionToken::new)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

impl AuthService {
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig, session: Arc<SessionStore>) -> Result<Self, reqwest::Error> {
        let client = config.client_builder().build()?;
        Ok(Self::with_client(client, config, session))
    }

    #[must_use]
    pub fn with_client(client: Client, config: ClientConfig, session: Arc<SessionStore>) -> Self {
        Self {
            client,
            config,
            session,
        }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Exchange credentials for a token and establish the session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on 401, `AuthError::MissingToken`
    /// when the response has no token, and transport or storage errors otherwise.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let url = self.config.endpoint("login")?;
        tracing::debug!("login request");
        let response = self
            .client
            .post(url)
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidCredentials);
        }
        let body: TokenResponse = read_success(response).await?;
        let token = body.into_token().ok_or(AuthError::MissingToken)?;
        Ok(self.session.establish(token, Some(email.to_string())).await?)
    }

    /// Create an account; signs the user in when the service returns a token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Rejected` with the service's explanation (e.g. an
    /// email already in use), and transport or storage errors otherwise.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterOutcome, AuthError> {
        let url = self.config.endpoint("register")?;
        tracing::debug!("register request");
        let response = self
            .client
            .post(url)
            .json(&RegisterRequest {
                name,
                email,
                password,
            })
            .send()
            .await?;

        let body: TokenResponse = read_success(response).await?;
        match body.into_token() {
            Some(token) => {
                let session = self.session.establish(token, Some(email.to_string())).await?;
                Ok(RegisterOutcome::SignedIn(session))
            }
            None => Ok(RegisterOutcome::LoginRequired),
        }
    }

    /// Tell the service the session is over, then forget it locally.
    ///
    /// The remote call is best effort; its failure is only logged.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the stored session cannot be removed.
    pub async fn logout(&self) -> Result<(), AuthError> {
        if let Some(token) = self.session.token() {
            match self.notify_logout(&token).await {
                Ok(()) => tracing::debug!("logout acknowledged"),
                Err(err) => tracing::warn!(%err, "logout request failed"),
            }
        }
        self.session.clear().await?;
        Ok(())
    }

    async fn notify_logout(&self, token: &SessionToken) -> Result<(), AuthError> {
        let url = self.config.endpoint("logout")?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token.as_str())
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(AuthError::Status(response.status()))
        }
    }
}

async fn read_success(response: reqwest::Response) -> Result<TokenResponse, AuthError> {
    let status = response.status();
    let bytes = response.bytes().await?;
    if !status.is_success() {
        return Err(match serde_json::from_slice::<ErrorBody>(&bytes) {
            Ok(body) => AuthError::Rejected(body.detail),
            Err(_) => AuthError::Status(status),
        });
    }
    Ok(serde_json::from_slice(&bytes).unwrap_or_default())
}
