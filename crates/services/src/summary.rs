use std::sync::Arc;

use questionnaire_core::model::Summary;

use crate::api::QuestionnaireApi;
use crate::error::ApiError;

/// What the summary screen can show.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryState {
    Ready(Summary),
    /// The run is not finished yet.
    Incomplete,
    /// The service returned no usable summary.
    NotAvailable,
}

/// Loads the summary behind a completion check.
#[derive(Clone)]
pub struct SummaryService {
    api: Arc<dyn QuestionnaireApi>,
}

impl SummaryService {
    #[must_use]
    pub fn new(api: Arc<dyn QuestionnaireApi>) -> Self {
        Self { api }
    }

    /// Check completion, then fetch the summary.
    ///
    /// A failed completion check counts as "not completed". A summary that
    /// cannot be decoded maps to `SummaryState::NotAvailable`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` from either call, and any other
    /// transport or status error from the summary request.
    pub async fn load(&self) -> Result<SummaryState, ApiError> {
        match self.api.progress().await {
            Ok(report) if report.is_completed => {}
            Ok(_) => return Ok(SummaryState::Incomplete),
            Err(err @ ApiError::Unauthorized) => return Err(err),
            Err(err) => {
                tracing::warn!(%err, "completion check failed, treating run as incomplete");
                return Ok(SummaryState::Incomplete);
            }
        }

        match self.api.summary().await {
            Ok(summary) => Ok(SummaryState::Ready(summary)),
            Err(ApiError::Decode(reason)) => {
                tracing::warn!(%reason, "summary response was malformed");
                Ok(SummaryState::NotAvailable)
            }
            Err(err) => Err(err),
        }
    }
}
