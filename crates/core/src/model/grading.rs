use thiserror::Error;

use crate::model::ids::QuestionId;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SummaryError {
    #[error("correct count ({correct}) exceeds question count ({total})")]
    CountMismatch { correct: usize, total: usize },

    #[error("accuracy rate {0} is outside 0..=100")]
    AccuracyOutOfRange(f64),
}

/// Authoritative outcome for one question, as reported by the grader.
#[derive(Debug, Clone, PartialEq)]
pub struct GradingResult {
    pub question_id: QuestionId,
    /// Empty when the question was not answered.
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub score: f64,
    pub max_score: f64,
    pub explanation: Option<String>,
}

impl GradingResult {
    #[must_use]
    pub fn is_unanswered(&self) -> bool {
        self.user_answer.trim().is_empty()
    }
}

/// Aggregate figures for a graded attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    total_score: f64,
    max_score: f64,
    total_questions: usize,
    correct_count: usize,
    accuracy_rate: f64,
}

impl SessionSummary {
    /// # Errors
    ///
    /// Returns `SummaryError::CountMismatch` if more questions are correct than exist,
    /// or `SummaryError::AccuracyOutOfRange` if the rate is not a percentage.
    pub fn new(
        total_score: f64,
        max_score: f64,
        total_questions: usize,
        correct_count: usize,
        accuracy_rate: f64,
    ) -> Result<Self, SummaryError> {
        if correct_count > total_questions {
            return Err(SummaryError::CountMismatch {
                correct: correct_count,
                total: total_questions,
            });
        }
        if !(0.0..=100.0).contains(&accuracy_rate) {
            return Err(SummaryError::AccuracyOutOfRange(accuracy_rate));
        }
        Ok(Self {
            total_score,
            max_score,
            total_questions,
            correct_count,
            accuracy_rate,
        })
    }

    #[must_use]
    pub fn total_score(&self) -> f64 {
        self.total_score
    }

    /// Sum of the attainable scores.
    #[must_use]
    pub fn max_score(&self) -> f64 {
        self.max_score
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    #[must_use]
    pub fn wrong_count(&self) -> usize {
        self.total_questions - self.correct_count
    }

    /// Percentage in `0..=100`.
    #[must_use]
    pub fn accuracy_rate(&self) -> f64 {
        self.accuracy_rate
    }
}

/// Summary plus one result per question, in question order.
#[derive(Debug, Clone, PartialEq)]
pub struct GradingReport {
    pub summary: SessionSummary,
    pub results: Vec<GradingResult>,
}
