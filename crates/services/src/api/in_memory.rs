use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::StatusCode;
use serde_json::Value;

use questionnaire_core::model::{
    Answer, AnswerValue, ProgressReport, Question, QuestionId, Summary, SummaryEntry,
};

use super::{QuestionnaireApi, SubmitOutcome};
use crate::Clock;
use crate::error::ApiError;
use crate::session::SessionStore;

/// Operations of the questionnaire service, used to script failures and
/// count calls on [`InMemoryQuestionnaireApi`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    InitialQuestion,
    Question,
    PreviousQuestion,
    SubmitAnswer,
    UpdateAnswer,
    Progress,
    Summary,
}

/// Failure to return instead of serving a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    /// Behaves like a 401: the attached session is cleared.
    Unauthorized,
    /// Behaves like a 503.
    Unavailable,
    /// The body could not be decoded.
    Malformed,
}

impl InjectedFailure {
    fn into_error(self, endpoint: Endpoint) -> ApiError {
        match self {
            Self::Unauthorized => ApiError::Unauthorized,
            Self::Unavailable => ApiError::Status(StatusCode::SERVICE_UNAVAILABLE),
            Self::Malformed => ApiError::Decode(format!("{endpoint:?}: injected malformed body")),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Injection {
    Once(InjectedFailure),
    Always(InjectedFailure),
}

#[derive(Debug, Default)]
struct ServiceState {
    answers: BTreeMap<QuestionId, Answer>,
    path: Vec<QuestionId>,
    started_at: Option<DateTime<Utc>>,
    last_activity: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    injections: HashMap<Endpoint, Injection>,
    calls: HashMap<Endpoint, usize>,
}

/// Scripted questionnaire service that walks a fixed, linear question list.
///
/// `initial_question` starts a new run; submitting the last question in the
/// list finishes it. Failures can be injected per endpoint, and an attached
/// [`SessionStore`] is cleared on injected 401s the way the HTTP gateway does.
pub struct InMemoryQuestionnaireApi {
    clock: Clock,
    questions: Vec<Question>,
    session: Option<Arc<SessionStore>>,
    state: Mutex<ServiceState>,
}

impl InMemoryQuestionnaireApi {
    #[must_use]
    pub fn new(clock: Clock, questions: Vec<Question>) -> Self {
        Self {
            clock,
            questions,
            session: None,
            state: Mutex::new(ServiceState::default()),
        }
    }

    #[must_use]
    pub fn with_session(mut self, session: Arc<SessionStore>) -> Self {
        self.session = Some(session);
        self
    }

    /// Fail the next call to `endpoint` only.
    pub fn fail_next(&self, endpoint: Endpoint, failure: InjectedFailure) {
        self.lock()
            .injections
            .insert(endpoint, Injection::Once(failure));
    }

    /// Fail every call to `endpoint` until [`Self::clear_failures`].
    pub fn fail_always(&self, endpoint: Endpoint, failure: InjectedFailure) {
        self.lock()
            .injections
            .insert(endpoint, Injection::Always(failure));
    }

    pub fn clear_failures(&self) {
        self.lock().injections.clear();
    }

    #[must_use]
    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.lock().calls.get(&endpoint).copied().unwrap_or(0)
    }

    /// Answer currently recorded for `id`, as JSON.
    #[must_use]
    pub fn recorded_answer(&self, id: QuestionId) -> Option<Value> {
        self.lock().answers.get(&id).map(|answer| answer.value.to_json())
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.lock().completed_at.is_some()
    }

    fn lock(&self) -> MutexGuard<'_, ServiceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn enter(&self, endpoint: Endpoint) -> Result<(), ApiError> {
        let failure = {
            let mut state = self.lock();
            *state.calls.entry(endpoint).or_default() += 1;
            match state.injections.get(&endpoint).copied() {
                Some(Injection::Always(failure)) => Some(failure),
                Some(Injection::Once(failure)) => {
                    state.injections.remove(&endpoint);
                    Some(failure)
                }
                None => None,
            }
        };

        let Some(failure) = failure else {
            return Ok(());
        };
        if failure == InjectedFailure::Unauthorized {
            if let Some(session) = &self.session {
                if let Err(err) = session.clear().await {
                    tracing::warn!(%err, "failed to clear session after injected 401");
                }
            }
        }
        Err(failure.into_error(endpoint))
    }

    fn position(&self, id: QuestionId) -> Result<usize, ApiError> {
        self.questions
            .iter()
            .position(|question| question.id() == id)
            .ok_or(ApiError::Status(StatusCode::NOT_FOUND))
    }

    fn record(&self, state: &mut ServiceState, id: QuestionId, value: &AnswerValue) {
        let now = self.clock.now();
        state.answers.insert(id, Answer::new(id, value.clone(), now));
        state.last_activity = Some(now);
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[async_trait]
impl QuestionnaireApi for InMemoryQuestionnaireApi {
    async fn initial_question(&self) -> Result<Question, ApiError> {
        self.enter(Endpoint::InitialQuestion).await?;
        let first = self
            .questions
            .first()
            .cloned()
            .ok_or(ApiError::Status(StatusCode::NOT_FOUND))?;

        let now = self.clock.now();
        let mut state = self.lock();
        state.answers.clear();
        state.path = vec![first.id()];
        state.started_at = Some(now);
        state.last_activity = Some(now);
        state.completed_at = None;
        Ok(first)
    }

    async fn question(&self, id: QuestionId) -> Result<Question, ApiError> {
        self.enter(Endpoint::Question).await?;
        let index = self.position(id)?;
        Ok(self.questions[index].clone())
    }

    async fn previous_question(&self, id: QuestionId) -> Result<Question, ApiError> {
        self.enter(Endpoint::PreviousQuestion).await?;
        let index = self.position(id)?;
        index
            .checked_sub(1)
            .map(|previous| self.questions[previous].clone())
            .ok_or(ApiError::Status(StatusCode::NOT_FOUND))
    }

    async fn submit_answer(
        &self,
        id: QuestionId,
        value: &AnswerValue,
    ) -> Result<SubmitOutcome, ApiError> {
        self.enter(Endpoint::SubmitAnswer).await?;
        let index = self.position(id)?;

        let mut state = self.lock();
        self.record(&mut state, id, value);
        if !state.path.contains(&id) {
            state.path.push(id);
        }

        match self.questions.get(index + 1) {
            Some(next) => {
                if !state.path.contains(&next.id()) {
                    state.path.push(next.id());
                }
                Ok(SubmitOutcome::Next(next.clone()))
            }
            None => {
                state.completed_at = Some(self.clock.now());
                Ok(SubmitOutcome::Finished)
            }
        }
    }

    async fn update_answer(&self, id: QuestionId, value: &AnswerValue) -> Result<(), ApiError> {
        self.enter(Endpoint::UpdateAnswer).await?;
        self.position(id)?;
        let mut state = self.lock();
        if !state.answers.contains_key(&id) {
            return Err(ApiError::Status(StatusCode::NOT_FOUND));
        }
        self.record(&mut state, id, value);
        Ok(())
    }

    async fn progress(&self) -> Result<ProgressReport, ApiError> {
        self.enter(Endpoint::Progress).await?;
        let state = self.lock();
        let is_completed = state.completed_at.is_some();

        Ok(ProgressReport {
            is_completed,
            current_question_id: if is_completed {
                None
            } else {
                state.path.last().copied()
            },
            total_questions: u32::try_from(self.questions.len()).unwrap_or(u32::MAX),
            completed_questions: state
                .path
                .iter()
                .copied()
                .filter(|id| state.answers.contains_key(id))
                .collect(),
            question_path: state.path.clone(),
            answers: state
                .answers
                .iter()
                .map(|(id, answer)| (*id, answer.value.to_json()))
                .collect(),
        })
    }

    async fn summary(&self) -> Result<Summary, ApiError> {
        self.enter(Endpoint::Summary).await?;
        let state = self.lock();

        let answered = state
            .path
            .iter()
            .filter(|id| state.answers.contains_key(id))
            .count();
        #[allow(clippy::cast_precision_loss)]
        let percentage = if self.questions.is_empty() {
            0.0
        } else {
            (answered as f64 / self.questions.len() as f64 * 100.0).min(100.0)
        };

        let user_answers = state
            .path
            .iter()
            .filter_map(|id| {
                let answer = state.answers.get(id)?;
                let question = self.questions.iter().find(|q| q.id() == *id)?;
                Some(SummaryEntry {
                    question_text: Some(question.text().to_string()),
                    answer_value: answer.value.to_json(),
                    timestamp: Some(timestamp(answer.submitted_at)),
                })
            })
            .collect();

        Ok(Summary {
            start_time: state.started_at.map(timestamp),
            last_activity: state.last_activity.map(timestamp),
            completion_time: state.completed_at.map(timestamp),
            completion_percentage: Some(percentage),
            user_answers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use questionnaire_core::model::{QuestionKind, TextRules};
    use questionnaire_core::time::fixed_clock;

    fn questions(count: u64) -> Vec<Question> {
        (1..=count)
            .map(|id| {
                Question::new(
                    QuestionId::new(id),
                    format!("Question {id}"),
                    QuestionKind::Text(TextRules::default()),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn walks_questions_in_order_and_finishes() {
        let api = InMemoryQuestionnaireApi::new(fixed_clock(), questions(2));
        let first = api.initial_question().await.unwrap();
        assert_eq!(first.id(), QuestionId::new(1));

        let outcome = api
            .submit_answer(first.id(), &AnswerValue::Text("a".into()))
            .await
            .unwrap();
        let SubmitOutcome::Next(second) = outcome else {
            panic!("expected a next question");
        };
        assert_eq!(second.id(), QuestionId::new(2));

        let outcome = api
            .submit_answer(second.id(), &AnswerValue::Skipped)
            .await
            .unwrap();
        assert!(outcome.is_finished());

        let progress = api.progress().await.unwrap();
        assert!(progress.is_completed);
        assert_eq!(progress.completed_questions.len(), 2);
        assert_eq!(progress.answers.get(&QuestionId::new(2)), Some(&Value::Null));

        let summary = api.summary().await.unwrap();
        assert!(summary.is_completed());
        assert_eq!(summary.completion_percentage, Some(100.0));
        assert_eq!(summary.user_answers.len(), 2);
    }

    #[tokio::test]
    async fn injected_failures_fire_once_or_always() {
        let api = InMemoryQuestionnaireApi::new(fixed_clock(), questions(1));
        api.fail_next(Endpoint::Progress, InjectedFailure::Unavailable);
        assert!(matches!(api.progress().await, Err(ApiError::Status(_))));
        assert!(api.progress().await.is_ok());

        api.fail_always(Endpoint::Summary, InjectedFailure::Malformed);
        assert!(matches!(api.summary().await, Err(ApiError::Decode(_))));
        assert!(matches!(api.summary().await, Err(ApiError::Decode(_))));
        api.clear_failures();
        assert!(api.summary().await.is_ok());
        assert_eq!(api.calls(Endpoint::Summary), 3);
    }

    #[tokio::test]
    async fn previous_question_of_first_is_not_found() {
        let api = InMemoryQuestionnaireApi::new(fixed_clock(), questions(2));
        let previous = api.previous_question(QuestionId::new(2)).await.unwrap();
        assert_eq!(previous.id(), QuestionId::new(1));
        assert!(matches!(
            api.previous_question(QuestionId::new(1)).await,
            Err(ApiError::Status(StatusCode::NOT_FOUND))
        ));
    }

    #[tokio::test]
    async fn update_requires_an_existing_answer() {
        let api = InMemoryQuestionnaireApi::new(fixed_clock(), questions(2));
        let id = QuestionId::new(1);
        assert!(api.update_answer(id, &AnswerValue::Text("x".into())).await.is_err());

        api.submit_answer(id, &AnswerValue::Text("x".into())).await.unwrap();
        api.update_answer(id, &AnswerValue::Text("y".into())).await.unwrap();
        assert_eq!(api.recorded_answer(id), Some(Value::String("y".into())));
    }
}
