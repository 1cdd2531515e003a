use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{debug, info, warn};

use exam_core::model::{AttemptId, CanonicalAnswer, Generation, GradingReport, OptionId, Question};
use exam_core::{AnswerCapture, Clock};

use super::dispatch::{AnswerFeedback, ExamCommand, ExamEffect};
use super::progress::ExamProgress;
use super::ticket::{GradingTicket, RequestKind, RequestTicket};
use crate::document::{DocumentName, DocumentStats, ParsedDocument};
use crate::error::{GradingError, ParserError, SessionError};
use crate::grading::GradingRequest;

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamPhase {
    Idle,
    InProgress,
    AwaitingGrading,
    ShowingResults,
    ShowingDetails,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One exam attempt and everything the UI needs to render it.
///
/// All mutation goes through the command methods (or `dispatch`), so a view can
/// be derived from the session at any instant. Collaborator calls are not made
/// here: the session hands out tickets and accepts their completions, dropping
/// any completion whose ticket no longer matches.
///
/// Invariant while in progress: `answers.len()` is `current` or `current + 1`.
pub struct ExamSession {
    clock: Clock,
    generation: Generation,
    attempt: Option<AttemptId>,
    phase: ExamPhase,
    document: Option<ParsedDocument>,
    questions: Vec<Question>,
    current: usize,
    capture: Option<AnswerCapture>,
    answers: Vec<CanonicalAnswer>,
    running_score: f64,
    pending: Option<RequestTicket>,
    last_failure: Option<String>,
    report: Option<GradingReport>,
    started_at: Option<DateTime<Utc>>,
    graded_at: Option<DateTime<Utc>>,
}

impl Default for ExamSession {
    fn default() -> Self {
        Self::new(Clock::default())
    }
}

impl ExamSession {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            generation: Generation::initial(),
            attempt: None,
            phase: ExamPhase::Idle,
            document: None,
            questions: Vec::new(),
            current: 0,
            capture: None,
            answers: Vec::new(),
            running_score: 0.0,
            pending: None,
            last_failure: None,
            report: None,
            started_at: None,
            graded_at: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> ExamPhase {
        self.phase
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub fn attempt(&self) -> Option<AttemptId> {
        self.attempt
    }

    #[must_use]
    pub fn document(&self) -> Option<&ParsedDocument> {
        self.document.as_ref()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            ExamPhase::InProgress => self.questions.get(self.current),
            _ => None,
        }
    }

    #[must_use]
    pub fn capture(&self) -> Option<&AnswerCapture> {
        self.capture.as_ref()
    }

    #[must_use]
    pub fn answers(&self) -> &[CanonicalAnswer] {
        &self.answers
    }

    /// Locally tracked score; advisory only, the grader's total is authoritative.
    #[must_use]
    pub fn running_score(&self) -> f64 {
        self.running_score
    }

    #[must_use]
    pub fn report(&self) -> Option<&GradingReport> {
        self.report.as_ref()
    }

    /// Message of the most recent collaborator failure, cleared on success.
    #[must_use]
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    #[must_use]
    pub fn pending(&self) -> Option<RequestTicket> {
        self.pending
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn graded_at(&self) -> Option<DateTime<Utc>> {
        self.graded_at
    }

    #[must_use]
    pub fn progress(&self) -> ExamProgress {
        ExamProgress {
            total: self.questions.len(),
            answered: self.answers.len(),
            current: self.current,
            is_last: self.current + 1 >= self.questions.len(),
        }
    }

    /// Feedback for the question on screen once it has been answered.
    #[must_use]
    pub fn current_feedback(&self) -> Option<AnswerFeedback> {
        match self.phase {
            ExamPhase::InProgress => self.feedback_for(self.current),
            _ => None,
        }
    }

    fn feedback_for(&self, index: usize) -> Option<AnswerFeedback> {
        let question = self.questions.get(index)?;
        let answer = self.answers.get(index)?;
        Some(AnswerFeedback {
            index,
            answer: answer.clone(),
            is_correct: answer == question.correct_answer(),
            correct_answer: question.correct_answer().clone(),
            explanation: question.explanation().map(str::to_owned),
            running_score: self.running_score,
            is_last: index + 1 == self.questions.len(),
        })
    }

    fn expect_phase(&self, expected: ExamPhase) -> Result<(), SessionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    fn ensure_no_pending(&self) -> Result<(), SessionError> {
        if self.pending.is_some() {
            return Err(SessionError::RequestInFlight);
        }
        Ok(())
    }

    /// Apply a completion only if it answers the outstanding request of `expected` kind.
    fn settle(
        &mut self,
        ticket: RequestTicket,
        expected: RequestKind,
    ) -> Result<(), SessionError> {
        if ticket.kind() != expected {
            warn!(
                expected = ?expected,
                actual = ?ticket.kind(),
                "rejecting completion for the wrong request kind"
            );
            return Err(SessionError::WrongRequestKind {
                expected,
                actual: ticket.kind(),
            });
        }
        if self.pending == Some(ticket) {
            self.pending = None;
            return Ok(());
        }
        warn!(
            ticket_generation = %ticket.generation(),
            current_generation = %self.generation,
            kind = ?ticket.kind(),
            "discarding stale response"
        );
        Err(SessionError::StaleResponse {
            ticket: ticket.generation(),
            current: self.generation,
        })
    }

    //
    // ─── DOCUMENT UPLOAD ──────────────────────────────────────────────────────
    //

    /// Validate the file name and reserve the request slot for an upload.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::DocumentName` for unsupported files (no call should
    /// be made), `InvalidPhase` outside Idle and `RequestInFlight` while another
    /// upload is pending.
    pub fn begin_upload(
        &mut self,
        file_name: &str,
    ) -> Result<(RequestTicket, DocumentName), SessionError> {
        self.expect_phase(ExamPhase::Idle)?;
        self.ensure_no_pending()?;
        let name = DocumentName::parse(file_name)?;

        let ticket = RequestTicket::new(self.generation, RequestKind::Upload);
        self.pending = Some(ticket);
        debug!(file = %name, generation = %self.generation, "upload started");
        Ok((ticket, name))
    }

    /// Accept the parser's outcome for an upload ticket.
    ///
    /// A failed parse keeps any previously loaded document.
    ///
    /// # Errors
    ///
    /// Returns `WrongRequestKind` for a grading ticket, `StaleResponse` if the
    /// ticket is outdated and `ParseFailed` with the parser's error otherwise.
    pub fn complete_upload(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<ParsedDocument, ParserError>,
    ) -> Result<DocumentStats, SessionError> {
        self.settle(ticket, RequestKind::Upload)?;
        match outcome {
            Ok(document) => {
                let stats = document.stats;
                info!(
                    questions = document.questions.len(),
                    total_score = stats.total_score,
                    "document loaded"
                );
                self.document = Some(document);
                self.last_failure = None;
                Ok(stats)
            }
            Err(err) => {
                warn!(error = %err, "document upload failed");
                self.last_failure = Some(err.to_string());
                Err(SessionError::ParseFailed(err))
            }
        }
    }

    //
    // ─── EXAM ─────────────────────────────────────────────────────────────────
    //

    /// Idle → InProgress with a fresh attempt over `questions`.
    ///
    /// # Errors
    ///
    /// Returns `EmptyQuestionSet` for an empty list, `InvalidPhase` outside Idle
    /// and `RequestInFlight` while an upload is pending.
    pub fn start_exam(
        &mut self,
        questions: Vec<Question>,
    ) -> Result<Vec<ExamEffect>, SessionError> {
        self.expect_phase(ExamPhase::Idle)?;
        self.ensure_no_pending()?;
        let Some(first) = questions.first() else {
            return Err(SessionError::EmptyQuestionSet);
        };

        self.capture = Some(AnswerCapture::new(first));
        self.generation = self.generation.next();
        let attempt = AttemptId::random();
        self.attempt = Some(attempt);
        self.questions = questions;
        self.current = 0;
        self.answers.clear();
        self.running_score = 0.0;
        self.report = None;
        self.last_failure = None;
        self.started_at = Some(self.clock.now());
        self.graded_at = None;
        self.phase = ExamPhase::InProgress;

        info!(
            %attempt,
            generation = %self.generation,
            questions = self.questions.len(),
            "exam started"
        );
        Ok(vec![ExamEffect::QuestionShown { index: 0 }])
    }

    /// Start with the questions of the loaded document.
    ///
    /// # Errors
    ///
    /// Returns `NoDocument` if nothing has been loaded, plus the errors of `start_exam`.
    pub fn start_loaded(&mut self) -> Result<Vec<ExamEffect>, SessionError> {
        self.expect_phase(ExamPhase::Idle)?;
        let questions = self
            .document
            .as_ref()
            .map(|document| document.questions.clone())
            .ok_or(SessionError::NoDocument)?;
        self.start_exam(questions)
    }

    /// Feed one selection event to the current question's capture.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPhase` outside the exam and `Capture` for unknown options
    /// or selections after submit.
    pub fn select(&mut self, id: OptionId) -> Result<(), SessionError> {
        self.expect_phase(ExamPhase::InProgress)?;
        let index = self.current;
        let phase = self.phase;
        let capture = self.capture.as_mut().ok_or(SessionError::InvalidPhase {
            expected: ExamPhase::InProgress,
            actual: phase,
        })?;
        capture.select(id)?;
        debug!(index, option = %id, selected = capture.is_selected(id), "selection changed");
        Ok(())
    }

    /// Record the canonical answer for the current question.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyAnswered` on a second submit for the same question and
    /// `NoSelection` when nothing is selected.
    pub fn submit(&mut self) -> Result<AnswerFeedback, SessionError> {
        self.expect_phase(ExamPhase::InProgress)?;
        let index = self.current;
        if self.answers.len() > index {
            return Err(SessionError::AlreadyAnswered { index });
        }

        let phase = self.phase;
        let capture = self.capture.as_mut().ok_or(SessionError::InvalidPhase {
            expected: ExamPhase::InProgress,
            actual: phase,
        })?;
        let answer = capture.canonical_answer().ok_or(SessionError::NoSelection)?;
        capture.lock();

        let question = &self.questions[index];
        if answer == *question.correct_answer() {
            self.running_score += question.max_score();
        }
        self.answers.push(answer);

        let feedback = self
            .feedback_for(index)
            .ok_or(SessionError::Unanswered { index })?;
        debug!(
            index,
            is_correct = feedback.is_correct,
            running_score = self.running_score,
            "answer recorded"
        );
        Ok(feedback)
    }

    /// Move to the next question, or hand the attempt to the grader after the last one.
    ///
    /// # Errors
    ///
    /// Returns `Unanswered` if the current question has no recorded answer.
    pub fn advance(&mut self) -> Result<Vec<ExamEffect>, SessionError> {
        self.expect_phase(ExamPhase::InProgress)?;
        let index = self.current;
        if self.answers.len() <= index {
            return Err(SessionError::Unanswered { index });
        }

        if index + 1 >= self.questions.len() {
            self.capture = None;
            self.phase = ExamPhase::AwaitingGrading;
            let ticket = self.issue_grading_ticket();
            return Ok(vec![ExamEffect::RequestGrading(ticket)]);
        }

        self.current = index + 1;
        self.capture = Some(AnswerCapture::new(&self.questions[self.current]));
        Ok(vec![ExamEffect::QuestionShown {
            index: self.current,
        }])
    }

    fn issue_grading_ticket(&mut self) -> GradingTicket {
        let ticket = RequestTicket::new(self.generation, RequestKind::Grading);
        self.pending = Some(ticket);
        let attempt = *self.attempt.get_or_insert_with(AttemptId::random);
        let request = GradingRequest::from_snapshot(&self.questions, &self.answers);
        info!(%attempt, generation = %self.generation, "grading requested");
        GradingTicket::new(ticket, attempt, request)
    }

    /// Issue a new grading ticket with the same snapshot after a failure.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPhase` outside AwaitingGrading and `RequestInFlight` while
    /// a grading call is still outstanding.
    pub fn retry_grading(&mut self) -> Result<GradingTicket, SessionError> {
        self.expect_phase(ExamPhase::AwaitingGrading)?;
        self.ensure_no_pending()?;
        Ok(self.issue_grading_ticket())
    }

    /// Accept the grader's outcome for a grading ticket.
    ///
    /// # Errors
    ///
    /// Returns `WrongRequestKind` for an upload ticket and `StaleResponse` for
    /// outdated tickets (nothing changes in either case). Returns
    /// `GradingUnavailable` when grading failed or the report does not line up
    /// with the questions; the session then stays in AwaitingGrading and can be
    /// retried.
    pub fn complete_grading(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<GradingReport, GradingError>,
    ) -> Result<Vec<ExamEffect>, SessionError> {
        self.settle(ticket, RequestKind::Grading)?;
        let outcome = outcome.and_then(|report| {
            if report.results.len() == self.questions.len() {
                Ok(report)
            } else {
                Err(GradingError::ResultCountMismatch {
                    expected: self.questions.len(),
                    got: report.results.len(),
                })
            }
        });
        match outcome {
            Ok(report) => {
                self.report = Some(report);
                self.last_failure = None;
                self.graded_at = Some(self.clock.now());
                self.phase = ExamPhase::ShowingResults;
                Ok(vec![ExamEffect::ResultsReady])
            }
            Err(err) => {
                self.last_failure = Some(err.to_string());
                Err(SessionError::GradingUnavailable(err))
            }
        }
    }

    //
    // ─── RESULTS ──────────────────────────────────────────────────────────────
    //

    /// # Errors
    ///
    /// Returns `InvalidPhase` unless results are showing.
    pub fn show_details(&mut self) -> Result<Vec<ExamEffect>, SessionError> {
        self.expect_phase(ExamPhase::ShowingResults)?;
        self.phase = ExamPhase::ShowingDetails;
        Ok(vec![ExamEffect::ViewChanged(self.phase)])
    }

    /// # Errors
    ///
    /// Returns `InvalidPhase` unless details are showing.
    pub fn back_to_results(&mut self) -> Result<Vec<ExamEffect>, SessionError> {
        self.expect_phase(ExamPhase::ShowingDetails)?;
        self.phase = ExamPhase::ShowingResults;
        Ok(vec![ExamEffect::ViewChanged(self.phase)])
    }

    /// Back to Idle from anywhere, discarding the attempt and any outstanding request.
    pub fn restart(&mut self) -> Vec<ExamEffect> {
        self.generation = self.generation.next();
        self.attempt = None;
        self.phase = ExamPhase::Idle;
        self.document = None;
        self.questions.clear();
        self.current = 0;
        self.capture = None;
        self.answers.clear();
        self.running_score = 0.0;
        self.pending = None;
        self.last_failure = None;
        self.report = None;
        self.started_at = None;
        self.graded_at = None;
        info!(generation = %self.generation, "session restarted");
        vec![ExamEffect::Reset]
    }

    /// Apply one command and return the effects the caller has to carry out.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying command; the session is unchanged.
    pub fn dispatch(&mut self, command: ExamCommand) -> Result<Vec<ExamEffect>, SessionError> {
        match command {
            ExamCommand::Start(questions) => self.start_exam(questions),
            ExamCommand::StartLoaded => self.start_loaded(),
            ExamCommand::Select(id) => self.select(id).map(|()| Vec::new()),
            ExamCommand::Submit => self
                .submit()
                .map(|feedback| vec![ExamEffect::AnswerRecorded(feedback)]),
            ExamCommand::Advance => self.advance(),
            ExamCommand::ShowDetails => self.show_details(),
            ExamCommand::BackToResults => self.back_to_results(),
            ExamCommand::RetryGrading => self
                .retry_grading()
                .map(|ticket| vec![ExamEffect::RequestGrading(ticket)]),
            ExamCommand::Restart => Ok(self.restart()),
        }
    }
}

impl fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSession")
            .field("generation", &self.generation)
            .field("phase", &self.phase)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("answers_len", &self.answers.len())
            .field("running_score", &self.running_score)
            .field("pending", &self.pending)
            .field("has_report", &self.report.is_some())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
