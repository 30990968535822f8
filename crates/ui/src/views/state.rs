use dioxus::prelude::*;
use services::{ApiError, AuthError, NavigationError};

/// User-facing failure states. Authorization failures never reach the screen
/// as text; views route `Unauthorized` to the login page instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    Unknown,
    Unauthorized,
    LoadQuestion,
    StartQuestionnaire,
    SubmitAnswer,
    FinishQuestionnaire,
    GoBack,
    LoadSummary,
    InvalidCredentials,
    Registration,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Unknown => "Something went wrong. Please try again.",
            Self::Unauthorized => "Your session has ended. Please log in again.",
            Self::LoadQuestion => "Failed to load question. Please try again.",
            Self::StartQuestionnaire => "Failed to start questionnaire. Please try again.",
            Self::SubmitAnswer => "Failed to submit answer. Please try again.",
            Self::FinishQuestionnaire => "Failed to finish questionnaire. Please try again.",
            Self::GoBack => "Failed to go back. Please try again.",
            Self::LoadSummary => "Failed to load summary. Please try again.",
            Self::InvalidCredentials => "Invalid email or password",
            Self::Registration => "Registration failed. Please try again.",
        }
    }

    /// Map a navigation failure, using `fallback` for anything that is not
    /// an authorization problem.
    #[must_use]
    pub fn from_navigation(err: &NavigationError, fallback: Self) -> Self {
        if err.requires_login() {
            Self::Unauthorized
        } else {
            fallback
        }
    }

    #[must_use]
    pub fn from_api(err: &ApiError, fallback: Self) -> Self {
        if err.is_unauthorized() {
            Self::Unauthorized
        } else {
            fallback
        }
    }

    #[must_use]
    pub fn from_login(err: &AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::MissingToken => Self::InvalidCredentials,
            _ => Self::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: &Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(*err),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}
