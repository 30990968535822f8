use questionnaire_core::model::{AnswerValue, FormValue, NumberRules, Question, QuestionKind};
use questionnaire_core::validation::{AnswerRule, ValidationError};

/// Input affordance chosen from a question's kind.
#[derive(Clone, Debug, PartialEq)]
pub enum InputWidget {
    TextArea,
    NumberField { min: Option<f64>, max: Option<f64> },
    DateField,
    ExclusiveChoices(Vec<String>),
    InclusiveChoices(Vec<String>),
}

impl InputWidget {
    #[must_use]
    pub fn for_kind(kind: &QuestionKind) -> Self {
        match kind {
            QuestionKind::Text(_) => Self::TextArea,
            QuestionKind::Number(NumberRules { min, max }) => Self::NumberField {
                min: *min,
                max: *max,
            },
            QuestionKind::Date => Self::DateField,
            QuestionKind::SingleChoice { options } => Self::ExclusiveChoices(options.clone()),
            QuestionKind::MultipleChoice { options } => Self::InclusiveChoices(options.clone()),
        }
    }
}

/// What submitting the form should do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormAction {
    Continue,
    Finish,
}

impl FormAction {
    #[must_use]
    pub fn for_last_question(is_last: bool) -> Self {
        if is_last { Self::Finish } else { Self::Continue }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Continue => "Next",
            Self::Finish => "Finish",
        }
    }
}

/// Form state for the question on screen.
#[derive(Clone, Debug, PartialEq)]
pub struct QuestionFormVm {
    question: Question,
    rule: AnswerRule,
    widget: InputWidget,
    value: FormValue,
    error: Option<ValidationError>,
}

impl QuestionFormVm {
    /// Build the form, shaping `initial` to the question's kind.
    #[must_use]
    pub fn new(question: Question, initial: FormValue) -> Self {
        let value = initial.conform_to(question.kind());
        Self {
            rule: AnswerRule::for_question(&question),
            widget: InputWidget::for_kind(question.kind()),
            question,
            value,
            error: None,
        }
    }

    #[must_use]
    pub fn question(&self) -> &Question {
        &self.question
    }

    #[must_use]
    pub fn widget(&self) -> &InputWidget {
        &self.widget
    }

    #[must_use]
    pub fn value(&self) -> &FormValue {
        &self.value
    }

    #[must_use]
    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.rule.is_required()
    }

    pub fn set_text(&mut self, text: String) {
        self.value = FormValue::Text(text);
        self.error = None;
    }

    pub fn toggle_option(&mut self, option: &str, selected: bool) {
        self.value.toggle(option, selected);
        self.error = None;
    }

    /// Validate the held value. On failure the error is kept for display.
    pub fn validate(&mut self) -> Option<AnswerValue> {
        match self.rule.check(&self.value) {
            Ok(answer) => {
                self.error = None;
                Some(answer)
            }
            Err(err) => {
                self.error = Some(err);
                None
            }
        }
    }
}
