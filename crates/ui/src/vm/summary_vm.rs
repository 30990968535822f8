use questionnaire_core::model::{Summary, SummaryEntry};
use serde_json::Value;

use super::time_fmt::format_service_timestamp;

pub const IN_PROGRESS: &str = "In Progress";
pub const NOT_ANSWERED: &str = "Not answered";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryAnswerVm {
    pub number: usize,
    pub question: String,
    pub answer: String,
    pub answered_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryVm {
    pub started_at: String,
    pub last_activity: String,
    pub completed_at: String,
    /// Completion percentage clamped to `0..=100`, for the progress bar width.
    pub percentage: u8,
    pub percentage_label: String,
    pub answers: Vec<SummaryAnswerVm>,
}

#[must_use]
pub fn map_summary(summary: &Summary) -> SummaryVm {
    let completed_at = match summary.completion_time.as_deref() {
        Some(raw) => format_service_timestamp(Some(raw)),
        None => IN_PROGRESS.to_string(),
    };
    let raw_percentage = summary
        .completion_percentage
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
        .clamp(0.0, 100.0);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percentage = raw_percentage.round() as u8;

    SummaryVm {
        started_at: format_service_timestamp(summary.start_time.as_deref()),
        last_activity: format_service_timestamp(summary.last_activity.as_deref()),
        completed_at,
        percentage,
        percentage_label: format!("{}% Complete", format_percentage(raw_percentage)),
        answers: summary
            .user_answers
            .iter()
            .enumerate()
            .map(|(index, entry)| map_entry(index + 1, entry))
            .collect(),
    }
}

fn map_entry(number: usize, entry: &SummaryEntry) -> SummaryAnswerVm {
    SummaryAnswerVm {
        number,
        question: entry.question_text.clone().unwrap_or_default(),
        answer: format_answer(&entry.answer_value),
        answered_at: format_service_timestamp(entry.timestamp.as_deref()),
    }
}

/// Render a stored answer: selection lists joined with `", "`, null as "Not answered".
#[must_use]
pub fn format_answer(value: &Value) -> String {
    match value {
        Value::Null => NOT_ANSWERED.to_string(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn format_percentage(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summary() -> Summary {
        serde_json::from_value(json!({
            "start_time": "2024-01-01T10:00:00Z",
            "last_activity": "not a date",
            "completion_time": null,
            "completion_percentage": 66.66,
            "user_answers": [
                { "question_text": "Tools?", "answer_value": ["hammer", "saw"], "timestamp": "2024-01-01T10:01:00Z" },
                { "question_text": "Age?", "answer_value": 42 },
                { "question_text": "Notes?", "answer_value": null }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn maps_dates_and_placeholders() {
        let vm = map_summary(&summary());
        assert_eq!(vm.started_at, "Jan 1, 2024, 10:00:00 AM");
        assert_eq!(vm.last_activity, "Invalid date");
        assert_eq!(vm.completed_at, IN_PROGRESS);
        assert_eq!(vm.percentage, 67);
        assert_eq!(vm.percentage_label, "66.7% Complete");
    }

    #[test]
    fn maps_answers_in_order() {
        let vm = map_summary(&summary());
        let answers: Vec<&str> = vm.answers.iter().map(|a| a.answer.as_str()).collect();
        assert_eq!(answers, vec!["hammer, saw", "42", NOT_ANSWERED]);
        assert_eq!(vm.answers[1].number, 2);
        assert_eq!(vm.answers[1].answered_at, "Not available");
    }

    #[test]
    fn empty_summary_uses_defaults() {
        let vm = map_summary(&Summary::default());
        assert_eq!(vm.started_at, "Not available");
        assert_eq!(vm.percentage, 0);
        assert_eq!(vm.percentage_label, "0% Complete");
        assert!(vm.answers.is_empty());
    }
}
