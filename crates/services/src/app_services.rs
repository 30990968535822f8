use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::api::{HttpQuestionnaireApi, QuestionnaireApi};
use crate::auth::AuthService;
use crate::config::ClientConfig;
use crate::error::AppServicesError;
use crate::navigation::NavigationController;
use crate::session::SessionStore;
use crate::summary::SummaryService;

/// Assembles app-facing services around one shared session.
#[derive(Clone)]
pub struct AppServices {
    session: Arc<SessionStore>,
    api: Arc<dyn QuestionnaireApi>,
    auth: Arc<AuthService>,
    summary: Arc<SummaryService>,
}

impl AppServices {
    /// Build services backed by `SQLite` session storage and the HTTP gateway.
    ///
    /// The persisted session is loaded before returning.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization, session loading or
    /// HTTP client construction fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        config: ClientConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let session = Arc::new(SessionStore::new(clock, Arc::clone(&storage.sessions)));
        session.load().await?;

        let api: Arc<dyn QuestionnaireApi> = Arc::new(HttpQuestionnaireApi::new(
            config.clone(),
            Arc::clone(&session),
        )?);
        let auth = Arc::new(AuthService::new(config, Arc::clone(&session))?);
        Ok(Self::from_parts(session, api, auth))
    }

    /// Wire services from already-built parts.
    #[must_use]
    pub fn from_parts(
        session: Arc<SessionStore>,
        api: Arc<dyn QuestionnaireApi>,
        auth: Arc<AuthService>,
    ) -> Self {
        let summary = Arc::new(SummaryService::new(Arc::clone(&api)));
        Self {
            session,
            api,
            auth,
            summary,
        }
    }

    #[must_use]
    pub fn session(&self) -> Arc<SessionStore> {
        Arc::clone(&self.session)
    }

    #[must_use]
    pub fn api(&self) -> Arc<dyn QuestionnaireApi> {
        Arc::clone(&self.api)
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }

    #[must_use]
    pub fn summary(&self) -> Arc<SummaryService> {
        Arc::clone(&self.summary)
    }

    /// A controller for a new visit to the questionnaire screen.
    #[must_use]
    pub fn navigation(&self) -> NavigationController {
        NavigationController::new(self.api(), self.session())
    }
}
