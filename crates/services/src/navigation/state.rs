use questionnaire_core::model::{FormValue, History, Progress, Question};

/// Local view of a questionnaire run.
///
/// Nothing here is authoritative: progress and the last-question flag are
/// re-derived from the service after every load and every mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationState {
    pub(crate) current: Option<Question>,
    pub(crate) held_answer: Option<FormValue>,
    pub(crate) history: History,
    pub(crate) progress: Progress,
    pub(crate) is_last: bool,
}

impl NavigationState {
    /// State for a run that starts at `first`.
    #[must_use]
    pub fn starting_at(first: Question) -> Self {
        Self {
            history: History::seeded(first.id()),
            current: Some(first),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn held_answer(&self) -> Option<&FormValue> {
        self.held_answer.as_ref()
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.is_last
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.history.has_previous()
    }

    /// Value to pre-fill the form with: the held answer shaped for the current
    /// question, or the question's empty default.
    #[must_use]
    pub fn form_value(&self) -> FormValue {
        let Some(question) = &self.current else {
            return FormValue::default();
        };
        match &self.held_answer {
            Some(value) => value.clone().conform_to(question.kind()),
            None => FormValue::default_for(question.kind()),
        }
    }
}
