use exam_core::model::{CanonicalAnswer, OptionId, Question};

use crate::exam::{ExamPhase, GradingTicket};

/// Discrete user commands fed into the session.
#[derive(Debug, Clone, PartialEq)]
pub enum ExamCommand {
    Start(Vec<Question>),
    /// Start with the questions of the loaded document.
    StartLoaded,
    Select(OptionId),
    Submit,
    Advance,
    ShowDetails,
    BackToResults,
    RetryGrading,
    Restart,
}

/// What the caller should do or show after a command.
#[derive(Debug, Clone, PartialEq)]
pub enum ExamEffect {
    QuestionShown { index: usize },
    AnswerRecorded(AnswerFeedback),
    /// Send this snapshot to the grader and complete the ticket with the outcome.
    RequestGrading(GradingTicket),
    ResultsReady,
    ViewChanged(ExamPhase),
    Reset,
}

/// Immediate, advisory feedback after submitting an answer.
///
/// The grader's verdict is authoritative; this only drives the in-exam display.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerFeedback {
    pub index: usize,
    pub answer: CanonicalAnswer,
    pub is_correct: bool,
    pub correct_answer: CanonicalAnswer,
    pub explanation: Option<String>,
    pub running_score: f64,
    pub is_last: bool,
}
