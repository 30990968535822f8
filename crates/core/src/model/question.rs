use std::fmt;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors raised while building a `Question` from service data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("invalid validation pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("min_length ({min}) is greater than max_length ({max})")]
    InvalidLengthRange { min: usize, max: usize },

    #[error("numeric bounds are inverted or not finite")]
    InvalidNumberRange,
}

//
// ─── PATTERN ──────────────────────────────────────────────────────────────────
//

/// A compiled answer pattern. Compared by its source text.
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Compile a pattern.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::InvalidPattern` if the expression does not compile.
    pub fn new(source: &str) -> Result<Self, QuestionError> {
        Regex::new(source)
            .map(Self)
            .map_err(|err| QuestionError::InvalidPattern {
                pattern: source.to_string(),
                reason: err.to_string(),
            })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    #[must_use]
    pub fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({:?})", self.as_str())
    }
}

//
// ─── QUESTION KIND ────────────────────────────────────────────────────────────
//

/// Constraints declared for free-text questions. Lengths count characters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextRules {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Pattern>,
}

/// Constraints declared for numeric questions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NumberRules {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// The declared answer shape of a question, each variant carrying its own constraints.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionKind {
    Text(TextRules),
    Number(NumberRules),
    Date,
    SingleChoice { options: Vec<String> },
    MultipleChoice { options: Vec<String> },
}

impl QuestionKind {
    /// Wire tag of this kind (`text`, `number`, ...).
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            QuestionKind::Text(_) => "text",
            QuestionKind::Number(_) => "number",
            QuestionKind::Date => "date",
            QuestionKind::SingleChoice { .. } => "single_choice",
            QuestionKind::MultipleChoice { .. } => "multiple_choice",
        }
    }

    /// Options offered by choice questions; empty for other kinds.
    #[must_use]
    pub fn options(&self) -> &[String] {
        match self {
            QuestionKind::SingleChoice { options } | QuestionKind::MultipleChoice { options } => {
                options
            }
            QuestionKind::Text(_) | QuestionKind::Number(_) | QuestionKind::Date => &[],
        }
    }
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// A single questionnaire item as served by the remote service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "QuestionRecord")]
pub struct Question {
    id: QuestionId,
    text: String,
    kind: QuestionKind,
    required: bool,
}

impl Question {
    #[must_use]
    pub fn new(id: QuestionId, text: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            id,
            text: text.into(),
            kind,
            required: false,
        }
    }

    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn kind(&self) -> &QuestionKind {
        &self.kind
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }
}

//
// ─── WIRE SHAPE ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum QuestionType {
    #[default]
    Text,
    Number,
    Date,
    SingleChoice,
    MultipleChoice,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Deserialize)]
struct ValidationRulesRecord {
    #[serde(default)]
    min_length: Option<usize>,
    #[serde(default)]
    max_length: Option<usize>,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct QuestionRecord {
    id: QuestionId,
    #[serde(alias = "question_text")]
    text: String,
    #[serde(rename = "type", default)]
    question_type: QuestionType,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    validation_rules: Option<ValidationRulesRecord>,
}

impl TryFrom<QuestionRecord> for Question {
    type Error = QuestionError;

    fn try_from(record: QuestionRecord) -> Result<Self, Self::Error> {
        let rules = record.validation_rules.unwrap_or_default();
        let options = record.options.unwrap_or_default();

        let kind = match record.question_type {
            QuestionType::Text => QuestionKind::Text(text_rules(rules)?),
            QuestionType::Number => QuestionKind::Number(number_rules(&rules)?),
            QuestionType::Date => QuestionKind::Date,
            QuestionType::SingleChoice => QuestionKind::SingleChoice { options },
            QuestionType::MultipleChoice => QuestionKind::MultipleChoice { options },
            QuestionType::Unknown => QuestionKind::Text(TextRules::default()),
        };

        Ok(Question::new(record.id, record.text, kind).with_required(record.required))
    }
}

fn text_rules(rules: ValidationRulesRecord) -> Result<TextRules, QuestionError> {
    if let (Some(min), Some(max)) = (rules.min_length, rules.max_length) {
        if min > max {
            return Err(QuestionError::InvalidLengthRange { min, max });
        }
    }
    let pattern = rules
        .pattern
        .filter(|source| !source.is_empty())
        .map(|source| Pattern::new(&source))
        .transpose()?;
    Ok(TextRules {
        min_length: rules.min_length,
        max_length: rules.max_length,
        pattern,
    })
}

fn number_rules(rules: &ValidationRulesRecord) -> Result<NumberRules, QuestionError> {
    let finite = |bound: Option<f64>| bound.is_none_or(f64::is_finite);
    if !finite(rules.min) || !finite(rules.max) {
        return Err(QuestionError::InvalidNumberRange);
    }
    if let (Some(min), Some(max)) = (rules.min, rules.max) {
        if min > max {
            return Err(QuestionError::InvalidNumberRange);
        }
    }
    Ok(NumberRules {
        min: rules.min,
        max: rules.max,
    })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
