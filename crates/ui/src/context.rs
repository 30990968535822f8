use std::sync::Arc;

use services::{AuthService, NavigationController, SessionStore, SummaryService};

/// Services the desktop shell needs from the composition root.
pub trait UiApp: Send + Sync {
    fn session(&self) -> Arc<SessionStore>;
    fn auth(&self) -> Arc<AuthService>;
    fn summary(&self) -> Arc<SummaryService>;

    /// A controller for one visit to the questionnaire screen.
    fn navigation(&self) -> NavigationController;
}

#[derive(Clone)]
pub struct AppContext {
    app: Arc<dyn UiApp>,
    session: Arc<SessionStore>,
    auth: Arc<AuthService>,
    summary: Arc<SummaryService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            app: Arc::clone(app),
            session: app.session(),
            auth: app.auth(),
            summary: app.summary(),
        }
    }

    #[must_use]
    pub fn session(&self) -> Arc<SessionStore> {
        Arc::clone(&self.session)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }

    #[must_use]
    pub fn summary(&self) -> Arc<SummaryService> {
        Arc::clone(&self.summary)
    }

    #[must_use]
    pub fn navigation(&self) -> NavigationController {
        self.app.navigation()
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
