//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::CaptureError;
use exam_core::model::{Generation, QuestionSetError, SummaryError};

use crate::exam::{ExamPhase, RequestKind};

/// How a failure is surfaced to the person taking the exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Recovered locally, shown inline; session state unchanged.
    Validation,
    /// Collaborator failure, shown as a dismissible notice; the action can be retried.
    Protocol,
    /// The question set is unusable and was rejected wholesale.
    MalformedData,
}

/// Errors emitted while reading the service configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid base url {raw:?}: {reason}")]
    InvalidBaseUrl { raw: String, reason: String },
    #[error("invalid timeout {0:?}: expected whole seconds")]
    InvalidTimeout(String),
}

/// Errors emitted while validating a document file name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DocumentNameError {
    #[error("no file selected")]
    Empty,
    #[error("unsupported file {0:?}: choose a Word document (.docx or .doc)")]
    UnsupportedExtension(String),
}

/// Errors emitted by document parser collaborators.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParserError {
    #[error("document parser rejected the file: {0}")]
    Rejected(String),
    #[error("document parser request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    MalformedQuestions(#[from] QuestionSetError),
}

/// Errors emitted by grader collaborators and the grading adapter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GradingError {
    #[error("grader rejected the submission: {0}")]
    Rejected(String),
    #[error("grader request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("grader returned {got} results for {expected} questions")]
    ResultCountMismatch { expected: usize, got: usize },
    #[error(transparent)]
    Summary(#[from] SummaryError),
}

/// Errors emitted by the exam session state machine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("the exam needs at least one question")]
    EmptyQuestionSet,
    #[error("select an option before submitting")]
    NoSelection,
    #[error("question {index} has already been answered")]
    AlreadyAnswered { index: usize },
    #[error("question {index} has not been answered yet")]
    Unanswered { index: usize },
    #[error("expected phase {expected:?}, session is {actual:?}")]
    InvalidPhase {
        expected: ExamPhase,
        actual: ExamPhase,
    },
    #[error("another request is still in flight")]
    RequestInFlight,
    #[error("no document has been loaded")]
    NoDocument,
    #[error("discarded stale response from generation {ticket} (current {current})")]
    StaleResponse {
        ticket: Generation,
        current: Generation,
    },
    #[error("expected a {expected:?} completion, got {actual:?}")]
    WrongRequestKind {
        expected: RequestKind,
        actual: RequestKind,
    },
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    DocumentName(#[from] DocumentNameError),
    #[error("document upload failed: {0}")]
    ParseFailed(#[source] ParserError),
    #[error("grading unavailable: {0}")]
    GradingUnavailable(#[source] GradingError),
}

impl SessionError {
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            SessionError::ParseFailed(ParserError::MalformedQuestions(_)) => {
                ErrorClass::MalformedData
            }
            SessionError::ParseFailed(_)
            | SessionError::GradingUnavailable(_)
            | SessionError::StaleResponse { .. }
            | SessionError::WrongRequestKind { .. } => ErrorClass::Protocol,
            _ => ErrorClass::Validation,
        }
    }
}
