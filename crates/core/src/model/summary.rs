use serde::Deserialize;
use serde_json::Value;

/// One answered question as listed in the summary.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SummaryEntry {
    #[serde(default)]
    pub question_text: Option<String>,
    #[serde(default)]
    pub answer_value: Value,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Summary of a run as reported by the questionnaire service (`GET /summary`).
///
/// Every field is optional; timestamps stay as the service sent them and are
/// interpreted at display time.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub last_activity: Option<String>,
    #[serde(default)]
    pub completion_time: Option<String>,
    #[serde(default)]
    pub completion_percentage: Option<f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub user_answers: Vec<SummaryEntry>,
}

impl Summary {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completion_time.is_some()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<SummaryEntry>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<SummaryEntry>>::deserialize(deserializer)?.unwrap_or_default())
}
