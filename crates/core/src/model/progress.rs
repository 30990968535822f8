use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer, de};
use serde_json::Value;

use crate::model::ids::QuestionId;

/// Progress as reported by the questionnaire service (`GET /progress`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProgressReport {
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub current_question_id: Option<QuestionId>,
    #[serde(default)]
    pub total_questions: u32,
    #[serde(default)]
    pub completed_questions: Vec<QuestionId>,
    #[serde(default)]
    pub question_path: Vec<QuestionId>,
    #[serde(default, deserialize_with = "deserialize_answers")]
    pub answers: BTreeMap<QuestionId, Value>,
}

/// Client-side view of progress, derived from a `ProgressReport`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Progress {
    pub total: u32,
    pub completed: u32,
    pub percentage: u8,
    pub path: Vec<QuestionId>,
    pub answers: BTreeMap<QuestionId, Value>,
}

impl Progress {
    #[must_use]
    pub fn from_report(report: &ProgressReport) -> Self {
        let completed = u32::try_from(report.completed_questions.len()).unwrap_or(u32::MAX);
        Self {
            total: report.total_questions,
            completed,
            percentage: completion_percentage(completed, report.total_questions),
            path: report.question_path.clone(),
            answers: report.answers.clone(),
        }
    }

    /// Whether the question on screen is the last one (`completed >= total - 1`).
    #[must_use]
    pub fn is_last_question(&self) -> bool {
        is_last_question(self.completed, self.total)
    }

    #[must_use]
    pub fn answer_for(&self, id: QuestionId) -> Option<&Value> {
        self.answers.get(&id)
    }
}

/// `round(completed / total * 100)` clamped to `0..=100`; zero when `total` is zero.
#[must_use]
pub fn completion_percentage(completed: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let ratio = f64::from(completed) / f64::from(total) * 100.0;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rounded = ratio.round().clamp(0.0, 100.0) as u8;
    rounded
}

/// The last question is the Nth of N, reached once N-1 answers are recorded.
#[must_use]
pub fn is_last_question(completed: u32, total: u32) -> bool {
    i64::from(completed) >= i64::from(total) - 1
}

fn deserialize_answers<'de, D>(deserializer: D) -> Result<BTreeMap<QuestionId, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<HashMap<String, Value>> = Option::deserialize(deserializer)?;
    raw.unwrap_or_default()
        .into_iter()
        .map(|(key, value)| {
            key.parse::<QuestionId>()
                .map(|id| (id, value))
                .map_err(de::Error::custom)
        })
        .collect()
}
