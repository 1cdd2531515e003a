use std::sync::Arc;

use async_trait::async_trait;
use exam_core::model::GradingReport;
use tracing::{info, warn};

use crate::error::GradingError;
use crate::exam::GradingTicket;
use crate::grading::{GradingRequest, GradingResponse};

/// External authority computing per-question correctness and the aggregate score.
///
/// Grading must be a pure function of the request so that retrying with the
/// same snapshot is safe.
#[async_trait]
pub trait Grader: Send + Sync {
    /// # Errors
    ///
    /// Returns `GradingError` if the grader is unreachable or the exchange fails.
    async fn grade(&self, request: &GradingRequest) -> Result<GradingResponse, GradingError>;
}

/// Sends a session snapshot to the grader and interprets its answer.
#[derive(Clone)]
pub struct GradingAdapter {
    grader: Arc<dyn Grader>,
}

impl GradingAdapter {
    #[must_use]
    pub fn new(grader: Arc<dyn Grader>) -> Self {
        Self { grader }
    }

    /// Grade the snapshot carried by `ticket`.
    ///
    /// # Errors
    ///
    /// Returns `GradingError` for transport failures and unusable responses.
    pub async fn grade(&self, ticket: &GradingTicket) -> Result<GradingReport, GradingError> {
        let request = ticket.request();
        let outcome = self
            .grader
            .grade(request)
            .await
            .and_then(|response| response.into_report(request.question_count()));

        match &outcome {
            Ok(report) => info!(
                attempt = %ticket.attempt(),
                total_score = report.summary.total_score(),
                correct = report.summary.correct_count(),
                "graded exam"
            ),
            Err(err) => warn!(attempt = %ticket.attempt(), error = %err, "grading failed"),
        }
        outcome
    }
}
