use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use questionnaire_core::model::{AnswerValue, ProgressReport, Question, QuestionId, Summary};

use super::{QuestionnaireApi, SubmitOutcome};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::SessionStore;

/// `reqwest`-backed gateway that attaches the session's bearer token.
#[derive(Clone)]
pub struct HttpQuestionnaireApi {
    client: Client,
    config: ClientConfig,
    session: Arc<SessionStore>,
}

impl HttpQuestionnaireApi {
    /// Build a gateway with its own HTTP client.
    ///
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
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.config.endpoint(path)?;
        tracing::debug!(%method, path, "questionnaire request");
        let builder = self.client.request(method, url);
        Ok(match self.session.token() {
            Some(token) => builder.bearer_auth(token.as_str()),
            None => builder,
        })
    }

    async fn execute(&self, request: RequestBuilder, path: &str) -> Result<Vec<u8>, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(path, "questionnaire service rejected the session");
            if let Err(err) = self.session.clear().await {
                tracing::warn!(%err, "failed to clear persisted session after 401");
            }
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            tracing::debug!(path, %status, "questionnaire request failed");
            return Err(ApiError::Status(status));
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder, path: &str) -> Result<T, ApiError> {
        let body = self.execute(request, path).await?;
        serde_json::from_slice(&body).map_err(|err| ApiError::Decode(format!("{path}: {err}")))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path)?;
        self.fetch(request, path).await
    }
}

#[derive(Debug, Serialize)]
struct AnswerPayload<'a> {
    question_id: QuestionId,
    answer_value: &'a AnswerValue,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    is_last: bool,
    #[serde(default)]
    question: Option<Question>,
}

#[async_trait]
impl QuestionnaireApi for HttpQuestionnaireApi {
    async fn initial_question(&self) -> Result<Question, ApiError> {
        self.get("questions/start").await
    }

    async fn question(&self, id: QuestionId) -> Result<Question, ApiError> {
        self.get(&format!("questions/{id}")).await
    }

    async fn previous_question(&self, id: QuestionId) -> Result<Question, ApiError> {
        self.get(&format!("questions/previous/{id}")).await
    }

    async fn submit_answer(
        &self,
        id: QuestionId,
        value: &AnswerValue,
    ) -> Result<SubmitOutcome, ApiError> {
        let path = "answers";
        let request = self.request(Method::POST, path)?.json(&AnswerPayload {
            question_id: id,
            answer_value: value,
        });
        let response: SubmitResponse = self.fetch(request, path).await?;

        match (response.is_last, response.question) {
            (true, _) => Ok(SubmitOutcome::Finished),
            (false, Some(question)) => Ok(SubmitOutcome::Next(question)),
            (false, None) => Err(ApiError::Decode(
                "answers: response has neither a next question nor is_last".into(),
            )),
        }
    }

    async fn update_answer(&self, id: QuestionId, value: &AnswerValue) -> Result<(), ApiError> {
        let path = format!("answers/{id}");
        let request = self.request(Method::PUT, &path)?.json(&AnswerPayload {
            question_id: id,
            answer_value: value,
        });
        self.execute(request, &path).await?;
        Ok(())
    }

    async fn progress(&self) -> Result<ProgressReport, ApiError> {
        self.get("progress").await
    }

    async fn summary(&self) -> Result<Summary, ApiError> {
        self.get("summary").await
    }
}
