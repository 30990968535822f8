use std::sync::Arc;

use questionnaire_core::model::{
    AnswerValue, FormValue, History, Progress, ProgressReport, Question, QuestionId,
};

use super::state::NavigationState;
use crate::api::{QuestionnaireApi, SubmitOutcome};
use crate::error::{ApiError, NavigationError};
use crate::session::SessionStore;

/// How to enter the questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartMode {
    /// Continue where the service says the user left off.
    #[default]
    Resume,
    /// Drop all local state and begin a new run.
    Fresh,
}

/// Where the flow stands after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// A question is on screen.
    Question,
    /// The run is finished; show the summary.
    Completed,
}

/// Drives which question is shown and when the run is finished.
///
/// Every operation leaves the local state untouched when the service call it
/// depends on fails, except `start(StartMode::Fresh)` which resets first.
pub struct NavigationController {
    api: Arc<dyn QuestionnaireApi>,
    session: Arc<SessionStore>,
    state: NavigationState,
}

impl NavigationController {
    #[must_use]
    pub fn new(api: Arc<dyn QuestionnaireApi>, session: Arc<SessionStore>) -> Self {
        Self {
            api,
            session,
            state: NavigationState::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.state.current()
    }

    #[must_use]
    pub fn history(&self) -> &History {
        self.state.history()
    }

    #[must_use]
    pub fn progress(&self) -> &Progress {
        self.state.progress()
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.state.is_last()
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.state.has_previous()
    }

    #[must_use]
    pub fn form_value(&self) -> FormValue {
        self.state.form_value()
    }

    /// Keep the form value for the question on screen.
    pub fn hold_answer(&mut self, value: FormValue) {
        self.state.held_answer = Some(value);
    }

    /// Enter the questionnaire.
    ///
    /// In resume mode the initial question is tried first; if the service
    /// refuses it for any reason other than authorization, the run is resumed
    /// from the service's progress record instead.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::Unauthenticated` without a session, and
    /// `NavigationError::Api` when the service cannot provide a question.
    pub async fn start(&mut self, mode: StartMode) -> Result<NavigationOutcome, NavigationError> {
        self.ensure_session()?;
        match mode {
            StartMode::Fresh => self.start_fresh().await,
            StartMode::Resume => self.resume().await,
        }
    }

    async fn start_fresh(&mut self) -> Result<NavigationOutcome, NavigationError> {
        self.state = NavigationState::default();
        let first = self.api.initial_question().await?;
        tracing::info!(question = %first.id(), "starting a new questionnaire run");
        self.state = NavigationState::starting_at(first);
        self.reconcile_after_mutation().await?;
        Ok(NavigationOutcome::Question)
    }

    async fn resume(&mut self) -> Result<NavigationOutcome, NavigationError> {
        match self.api.initial_question().await {
            Ok(first) => {
                self.state = NavigationState::starting_at(first);
                self.reconcile_after_mutation().await?;
                return Ok(NavigationOutcome::Question);
            }
            Err(err) if err.is_unauthorized() => return Err(err.into()),
            Err(err) => {
                tracing::info!(%err, "initial question unavailable, resuming from progress");
            }
        }

        let report = self.api.progress().await?;
        if report.is_completed {
            tracing::info!("questionnaire already completed, starting over");
            return self.start_fresh().await;
        }
        let Some(current_id) = report.current_question_id else {
            tracing::info!("no current question recorded, starting over");
            return self.start_fresh().await;
        };

        let question = self.api.question(current_id).await?;
        self.state = resumed_state(question, &report);
        tracing::info!(
            question = %current_id,
            visited = self.state.history.len(),
            "resumed questionnaire run"
        );
        Ok(NavigationOutcome::Question)
    }

    /// Send the answer for question `id` and advance.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError` when there is no session or question on
    /// screen, or when the service rejects the answer. State is unchanged on
    /// error.
    pub async fn submit(
        &mut self,
        id: QuestionId,
        value: &AnswerValue,
    ) -> Result<NavigationOutcome, NavigationError> {
        self.ensure_session()?;
        self.ensure_question()?;

        match self.api.submit_answer(id, value).await? {
            SubmitOutcome::Finished => self.complete().await,
            SubmitOutcome::Next(next) => {
                tracing::debug!(from = %id, to = %next.id(), "advanced to next question");
                self.state.history.push(next.id());
                self.state.current = Some(next);
                self.state.held_answer = None;
                self.reconcile_after_mutation().await?;
                Ok(NavigationOutcome::Question)
            }
        }
    }

    /// Send the answer to the last question and end the run.
    ///
    /// Any "next question" in the response is ignored.
    ///
    /// # Errors
    ///
    /// Same as [`Self::submit`].
    pub async fn finish(
        &mut self,
        id: QuestionId,
        value: &AnswerValue,
    ) -> Result<NavigationOutcome, NavigationError> {
        self.ensure_session()?;
        self.ensure_question()?;

        self.api.submit_answer(id, value).await?;
        self.complete().await
    }

    async fn complete(&mut self) -> Result<NavigationOutcome, NavigationError> {
        self.state.is_last = true;
        self.reconcile_after_mutation().await?;
        tracing::info!("questionnaire run completed");
        Ok(NavigationOutcome::Completed)
    }

    /// Step back to the previously visited question.
    ///
    /// Does nothing when there is no earlier question in the history.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError` when there is no session or the earlier
    /// question cannot be fetched. State is unchanged on error.
    pub async fn previous(&mut self) -> Result<(), NavigationError> {
        self.ensure_session()?;
        let Some(previous_id) = self.state.history.previous_id() else {
            return Ok(());
        };

        let question = self.api.question(previous_id).await?;
        self.state.history.pop();
        self.state.held_answer = self
            .state
            .progress
            .answer_for(previous_id)
            .map(|stored| FormValue::from_json(stored).conform_to(question.kind()));
        self.state.current = Some(question);
        self.state.is_last = false;
        self.reconcile_after_mutation().await?;
        Ok(())
    }

    /// Re-read progress from the service and recompute the derived flags.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::Api` if progress cannot be fetched; local
    /// progress is unchanged in that case.
    pub async fn reconcile(&mut self) -> Result<(), NavigationError> {
        let report = self.api.progress().await?;
        self.apply_report(&report);
        Ok(())
    }

    /// Reconcile after the service has accepted a change. Only an
    /// authorization failure is reported; anything else keeps the old progress.
    async fn reconcile_after_mutation(&mut self) -> Result<(), NavigationError> {
        match self.api.progress().await {
            Ok(report) => {
                self.apply_report(&report);
                Ok(())
            }
            Err(err @ ApiError::Unauthorized) => Err(err.into()),
            Err(err) => {
                tracing::warn!(%err, "progress refresh failed, keeping previous progress");
                Ok(())
            }
        }
    }

    fn apply_report(&mut self, report: &ProgressReport) {
        self.state.progress = Progress::from_report(report);
        self.state.is_last = self.state.progress.is_last_question();
    }

    fn ensure_session(&self) -> Result<(), NavigationError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(NavigationError::Unauthenticated)
        }
    }

    fn ensure_question(&self) -> Result<(), NavigationError> {
        if self.state.current.is_some() {
            Ok(())
        } else {
            Err(NavigationError::NoCurrentQuestion)
        }
    }
}

fn resumed_state(question: Question, report: &ProgressReport) -> NavigationState {
    let mut history = if report.question_path.is_empty() {
        History::seeded(question.id())
    } else {
        History::from_path(report.question_path.iter().copied())
    };
    // Some services record only answered questions in the path.
    if history.last() != Some(question.id()) {
        history.push(question.id());
    }
    let progress = Progress::from_report(report);
    let held_answer = progress
        .answer_for(question.id())
        .map(|stored| FormValue::from_json(stored).conform_to(question.kind()));

    NavigationState {
        is_last: progress.is_last_question(),
        current: Some(question),
        held_answer,
        history,
        progress,
    }
}
