use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::Value;

use crate::model::ids::QuestionId;
use crate::model::question::QuestionKind;

//
// ─── FORM VALUE ───────────────────────────────────────────────────────────────
//

/// Raw value held by an input widget before validation.
///
/// Every widget except the inclusive choice list edits a string; the inclusive
/// list edits an ordered set of selected options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    Selections(Vec<String>),
}

impl Default for FormValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl FormValue {
    /// Empty value appropriate to the question kind.
    #[must_use]
    pub fn default_for(kind: &QuestionKind) -> Self {
        match kind {
            QuestionKind::MultipleChoice { .. } => Self::Selections(Vec::new()),
            QuestionKind::Text(_)
            | QuestionKind::Number(_)
            | QuestionKind::Date
            | QuestionKind::SingleChoice { .. } => Self::Text(String::new()),
        }
    }

    /// Rebuild a form value from an answer previously stored by the service.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Text(String::new()),
            Value::String(text) => Self::Text(text.clone()),
            Value::Number(number) => Self::Text(number.to_string()),
            Value::Bool(flag) => Self::Text(flag.to_string()),
            Value::Array(items) => {
                let mut selections = Vec::with_capacity(items.len());
                for item in items {
                    let label = match item {
                        Value::String(text) => text.clone(),
                        other => other.to_string(),
                    };
                    if !selections.contains(&label) {
                        selections.push(label);
                    }
                }
                Self::Selections(selections)
            }
            Value::Object(_) => Self::Text(value.to_string()),
        }
    }

    /// Coerce to the shape the question kind expects, keeping compatible content.
    #[must_use]
    pub fn conform_to(self, kind: &QuestionKind) -> Self {
        match (kind, self) {
            (QuestionKind::MultipleChoice { .. }, Self::Text(text)) if text.is_empty() => {
                Self::Selections(Vec::new())
            }
            (QuestionKind::MultipleChoice { .. }, Self::Text(text)) => Self::Selections(vec![text]),
            (QuestionKind::MultipleChoice { .. }, value @ Self::Selections(_)) => value,
            (_, Self::Selections(items)) => Self::Text(items.into_iter().next().unwrap_or_default()),
            (_, value @ Self::Text(_)) => value,
        }
    }

    /// String content, or `""` for a selection set.
    #[must_use]
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Selections(_) => "",
        }
    }

    /// Selected options, or an empty slice for a string value.
    #[must_use]
    pub fn selections(&self) -> &[String] {
        match self {
            Self::Text(_) => &[],
            Self::Selections(items) => items,
        }
    }

    #[must_use]
    pub fn is_selected(&self, option: &str) -> bool {
        match self {
            Self::Text(text) => text == option,
            Self::Selections(items) => items.iter().any(|item| item == option),
        }
    }

    /// Add or remove an option from an inclusive selection, keeping insertion order.
    pub fn toggle(&mut self, option: &str, selected: bool) {
        if let Self::Text(text) = self {
            let existing = std::mem::take(text);
            *self = Self::Selections(if existing.is_empty() {
                Vec::new()
            } else {
                vec![existing]
            });
        }
        if let Self::Selections(items) = self {
            let present = items.iter().position(|item| item == option);
            match (selected, present) {
                (true, None) => items.push(option.to_string()),
                (false, Some(index)) => {
                    items.remove(index);
                }
                _ => {}
            }
        }
    }
}

//
// ─── ANSWER VALUE ─────────────────────────────────────────────────────────────
//

/// Validated answer payload, typed by the question it answers.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Choice(String),
    Choices(Vec<String>),
    /// Optional question left empty.
    Skipped,
}

impl AnswerValue {
    /// JSON representation sent to the service.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for AnswerValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AnswerValue::Text(text) | AnswerValue::Choice(text) => serializer.serialize_str(text),
            AnswerValue::Number(number) => serialize_number(*number, serializer),
            AnswerValue::Date(date) => {
                serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
            }
            AnswerValue::Choices(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            AnswerValue::Skipped => serializer.serialize_none(),
        }
    }
}

// Whole numbers go out as integers so the service sees `5`, not `5.0`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::float_cmp)]
fn serialize_number<S: Serializer>(number: f64, serializer: S) -> Result<S::Ok, S::Error> {
    let whole = number as i64;
    if number.fract() == 0.0 && whole as f64 == number {
        serializer.serialize_i64(whole)
    } else {
        serializer.serialize_f64(number)
    }
}

//
// ─── ANSWER ───────────────────────────────────────────────────────────────────
//

/// A submitted answer bound to its question.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub question_id: QuestionId,
    pub value: AnswerValue,
    pub submitted_at: DateTime<Utc>,
}

impl Answer {
    #[must_use]
    pub fn new(question_id: QuestionId, value: AnswerValue, submitted_at: DateTime<Utc>) -> Self {
        Self {
            question_id,
            value,
            submitted_at,
        }
    }
}
