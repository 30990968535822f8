#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod auth;
pub mod config;
pub mod error;
pub mod navigation;
pub mod session;
pub mod summary;

pub use questionnaire_core::Clock;

pub use api::{HttpQuestionnaireApi, InMemoryQuestionnaireApi, QuestionnaireApi, SubmitOutcome};
pub use app_services::AppServices;
pub use auth::{AuthService, RegisterOutcome};
pub use config::ClientConfig;
pub use error::{ApiError, AppServicesError, AuthError, NavigationError, SessionError};
pub use navigation::{NavigationController, NavigationOutcome, NavigationState, StartMode};
pub use session::{Session, SessionStore, SessionToken};
pub use summary::{SummaryService, SummaryState};
