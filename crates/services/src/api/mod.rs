//! Gateway to the remote questionnaire service.
//!
//! [`QuestionnaireApi`] is the seam the navigation and summary services talk
//! to. [`HttpQuestionnaireApi`] is the production implementation;
//! [`InMemoryQuestionnaireApi`] is a scripted stand-in for tests and previews.

mod http;
mod in_memory;

use async_trait::async_trait;
use questionnaire_core::model::{AnswerValue, ProgressReport, Question, QuestionId, Summary};

use crate::error::ApiError;

pub use http::HttpQuestionnaireApi;
pub use in_memory::{Endpoint, InMemoryQuestionnaireApi, InjectedFailure};

/// What the service answered to a submitted answer.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The flow continues with this question.
    Next(Question),
    /// The submitted question was the last one.
    Finished,
}

impl SubmitOutcome {
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

/// Request/response contract of the questionnaire service.
///
/// Every method returns `ApiError::Unauthorized` when the service rejects the
/// session; implementations clear the local session before returning it.
#[async_trait]
pub trait QuestionnaireApi: Send + Sync {
    /// `GET /questions/start`
    async fn initial_question(&self) -> Result<Question, ApiError>;

    /// `GET /questions/{id}`
    async fn question(&self, id: QuestionId) -> Result<Question, ApiError>;

    /// `GET /questions/previous/{id}`
    async fn previous_question(&self, id: QuestionId) -> Result<Question, ApiError>;

    /// `POST /answers`
    async fn submit_answer(
        &self,
        id: QuestionId,
        value: &AnswerValue,
    ) -> Result<SubmitOutcome, ApiError>;

    /// `PUT /answers/{id}`
    async fn update_answer(&self, id: QuestionId, value: &AnswerValue) -> Result<(), ApiError>;

    /// `GET /progress`
    async fn progress(&self) -> Result<ProgressReport, ApiError>;

    /// `GET /summary`
    async fn summary(&self) -> Result<Summary, ApiError>;
}
