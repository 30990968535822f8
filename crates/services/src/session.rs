//! Process-wide authentication session.
//!
//! The store is hydrated from the session repository at startup, set after a
//! successful login, and cleared on logout or whenever the questionnaire
//! service answers 401. Reads are synchronous so request builders can attach
//! the bearer token without awaiting.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use storage::repository::{InMemoryRepository, SessionRecord, SessionRepository};

use crate::Clock;
use crate::error::SessionError;

/// Bearer token issued by the questionnaire service.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// An authenticated user context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: SessionToken,
    pub email: Option<String>,
    pub established_at: DateTime<Utc>,
}

impl Session {
    fn from_record(record: SessionRecord) -> Option<Self> {
        if record.token.trim().is_empty() {
            return None;
        }
        Some(Self {
            token: SessionToken(record.token),
            email: record.email,
            established_at: record.created_at,
        })
    }

    fn to_record(&self) -> SessionRecord {
        SessionRecord {
            token: self.token.0.clone(),
            email: self.email.clone(),
            created_at: self.established_at,
        }
    }
}

pub struct SessionStore {
    clock: Clock,
    repo: Arc<dyn SessionRepository>,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(clock: Clock, repo: Arc<dyn SessionRepository>) -> Self {
        Self {
            clock,
            repo,
            current: RwLock::new(None),
        }
    }

    /// Store backed by a fresh in-memory repository.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(clock, Arc::new(InMemoryRepository::new()))
    }

    /// Hydrate the cache from the repository.
    ///
    /// A stored record with a blank token is treated as no session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the repository cannot be read.
    pub async fn load(&self) -> Result<Option<Session>, SessionError> {
        let session = self
            .repo
            .load_session()
            .await?
            .and_then(Session::from_record);
        self.replace(session.clone());
        tracing::debug!(authenticated = session.is_some(), "session hydrated");
        Ok(session)
    }

    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn token(&self) -> Option<SessionToken> {
        self.current().map(|session| session.token)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Persist and cache a new session, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the session cannot be persisted; the
    /// cache is left unchanged in that case.
    pub async fn establish(
        &self,
        token: SessionToken,
        email: Option<String>,
    ) -> Result<Session, SessionError> {
        let session = Session {
            token,
            email,
            established_at: self.clock.now(),
        };
        self.repo.save_session(&session.to_record()).await?;
        self.replace(Some(session.clone()));
        tracing::info!(email = ?session.email, "session established");
        Ok(session)
    }

    /// Forget the session locally and in the repository.
    ///
    /// The in-memory session is dropped even if the repository write fails.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the persisted session cannot be removed.
    pub async fn clear(&self) -> Result<(), SessionError> {
        self.replace(None);
        self.repo.clear_session().await?;
        tracing::info!("session cleared");
        Ok(())
    }

    fn replace(&self, session: Option<Session>) {
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = session;
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
