//! Presentation-layer answer checks derived from a question's kind and constraints.

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{AnswerValue, FormValue, NumberRules, Question, QuestionKind, TextRules};

/// Why a form value was rejected. The `Display` text is shown under the field.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("This field is required")]
    Required,
    #[error("Please select an option")]
    SelectionRequired,
    #[error("Please select at least one option")]
    TooFewSelections { min: usize },
    #[error("Minimum {min} characters required")]
    TooShort { min: usize },
    #[error("Maximum {max} characters allowed")]
    TooLong { max: usize },
    #[error("Invalid format")]
    PatternMismatch,
    #[error("Must be a number")]
    NotANumber,
    #[error("Must be at least {min}")]
    BelowMinimum { min: f64 },
    #[error("Must be at most {max}")]
    AboveMaximum { max: f64 },
    #[error("Must be a valid date")]
    InvalidDate,
    #[error("Unknown option: {0}")]
    UnknownOption(String),
}

/// Validation rule for one question: its kind-specific constraints plus required-ness.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerRule {
    Text { required: bool, rules: TextRules },
    Number { required: bool, rules: NumberRules },
    Date { required: bool },
    SingleChoice { required: bool, options: Vec<String> },
    MultipleChoice { required: bool, options: Vec<String> },
}

impl AnswerRule {
    #[must_use]
    pub fn for_question(question: &Question) -> Self {
        let required = question.is_required();
        match question.kind() {
            QuestionKind::Text(rules) => Self::Text {
                required,
                rules: rules.clone(),
            },
            QuestionKind::Number(rules) => Self::Number {
                required,
                rules: *rules,
            },
            QuestionKind::Date => Self::Date { required },
            QuestionKind::SingleChoice { options } => Self::SingleChoice {
                required,
                options: options.clone(),
            },
            QuestionKind::MultipleChoice { options } => Self::MultipleChoice {
                required,
                options: options.clone(),
            },
        }
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        match self {
            Self::Text { required, .. }
            | Self::Number { required, .. }
            | Self::Date { required }
            | Self::SingleChoice { required, .. }
            | Self::MultipleChoice { required, .. } => *required,
        }
    }

    /// Minimum number of selections an inclusive choice list accepts.
    #[must_use]
    pub fn min_selections(&self) -> usize {
        match self {
            Self::MultipleChoice { required: true, .. } => 1,
            _ => 0,
        }
    }

    /// Check a form value and convert it into the typed answer to submit.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` the value violates.
    pub fn check(&self, value: &FormValue) -> Result<AnswerValue, ValidationError> {
        match self {
            Self::Text { required, rules } => check_text(*required, rules, value.as_text()),
            Self::Number { required, rules } => check_number(*required, *rules, value.as_text()),
            Self::Date { required } => check_date(*required, value.as_text()),
            Self::SingleChoice { required, options } => {
                check_single(*required, options, value.as_text())
            }
            Self::MultipleChoice { options, .. } => {
                check_multiple(self.min_selections(), options, value.selections())
            }
        }
    }
}

/// Validate `value` against the rule derived from `question`.
///
/// # Errors
///
/// Returns the first `ValidationError` the value violates.
pub fn validate_answer(question: &Question, value: &FormValue) -> Result<AnswerValue, ValidationError> {
    AnswerRule::for_question(question).check(value)
}

fn check_text(required: bool, rules: &TextRules, raw: &str) -> Result<AnswerValue, ValidationError> {
    if raw.trim().is_empty() {
        return if required {
            Err(ValidationError::Required)
        } else {
            Ok(AnswerValue::Skipped)
        };
    }

    let length = raw.chars().count();
    if let Some(min) = rules.min_length {
        if length < min {
            return Err(ValidationError::TooShort { min });
        }
    }
    if let Some(max) = rules.max_length {
        if length > max {
            return Err(ValidationError::TooLong { max });
        }
    }
    if let Some(pattern) = &rules.pattern {
        if !pattern.is_match(raw) {
            return Err(ValidationError::PatternMismatch);
        }
    }
    Ok(AnswerValue::Text(raw.to_string()))
}

fn check_number(required: bool, rules: NumberRules, raw: &str) -> Result<AnswerValue, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return if required {
            Err(ValidationError::Required)
        } else {
            Ok(AnswerValue::Skipped)
        };
    }

    let number: f64 = trimmed.parse().map_err(|_| ValidationError::NotANumber)?;
    if !number.is_finite() {
        return Err(ValidationError::NotANumber);
    }
    if let Some(min) = rules.min {
        if number < min {
            return Err(ValidationError::BelowMinimum { min });
        }
    }
    if let Some(max) = rules.max {
        if number > max {
            return Err(ValidationError::AboveMaximum { max });
        }
    }
    Ok(AnswerValue::Number(number))
}

fn check_date(required: bool, raw: &str) -> Result<AnswerValue, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return if required {
            Err(ValidationError::Required)
        } else {
            Ok(AnswerValue::Skipped)
        };
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(AnswerValue::Date)
        .map_err(|_| ValidationError::InvalidDate)
}

fn check_single(required: bool, options: &[String], raw: &str) -> Result<AnswerValue, ValidationError> {
    if raw.is_empty() {
        return if required {
            Err(ValidationError::SelectionRequired)
        } else {
            Ok(AnswerValue::Skipped)
        };
    }
    if !options.is_empty() && !options.iter().any(|option| option == raw) {
        return Err(ValidationError::UnknownOption(raw.to_string()));
    }
    Ok(AnswerValue::Choice(raw.to_string()))
}

fn check_multiple(
    min_selections: usize,
    options: &[String],
    selected: &[String],
) -> Result<AnswerValue, ValidationError> {
    if selected.len() < min_selections {
        return Err(ValidationError::TooFewSelections {
            min: min_selections,
        });
    }
    if !options.is_empty() {
        if let Some(unknown) = selected.iter().find(|item| !options.contains(item)) {
            return Err(ValidationError::UnknownOption(unknown.clone()));
        }
    }
    Ok(AnswerValue::Choices(selected.to_vec()))
}
