use std::sync::Arc;

use crate::config::ExamConfig;
use crate::document::{
    DocumentParser, DocumentStats, DocumentUpload, HttpDocumentParser, ParseResponse,
};
use crate::exam::{ExamCommand, ExamEffect, ExamSession, GradingTicket, SessionError};
use crate::grading::{Grader, GradingAdapter, HttpGrader};

/// Drives a session against its collaborators.
///
/// The session stays synchronous; this service performs the calls its effects
/// ask for and feeds the outcomes back with the matching ticket.
#[derive(Clone)]
pub struct ExamLoopService {
    parser: Arc<dyn DocumentParser>,
    grading: GradingAdapter,
}

impl ExamLoopService {
    #[must_use]
    pub fn new(parser: Arc<dyn DocumentParser>, grader: Arc<dyn Grader>) -> Self {
        Self {
            parser,
            grading: GradingAdapter::new(grader),
        }
    }

    /// HTTP parser and grader sharing one client.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the client cannot be built.
    pub fn from_config(config: &ExamConfig) -> Result<Self, reqwest::Error> {
        let client = config.http_client()?;
        Ok(Self::new(
            Arc::new(HttpDocumentParser::new(client.clone(), config)),
            Arc::new(HttpGrader::new(client, config)),
        ))
    }

    /// Upload a document and keep its questions on the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::DocumentName` without calling the parser when the
    /// file is not a Word document, and `ParseFailed` when parsing fails.
    pub async fn load_document(
        &self,
        session: &mut ExamSession,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<DocumentStats, SessionError> {
        let (ticket, name) = session.begin_upload(file_name)?;
        let upload = DocumentUpload::new(name, bytes);
        let outcome = self
            .parser
            .parse(&upload)
            .await
            .and_then(ParseResponse::into_document);
        session.complete_upload(ticket, outcome)
    }

    /// Apply a command and carry out any grading request it produces.
    ///
    /// # Errors
    ///
    /// Returns the command's error, or `GradingUnavailable` when the grader
    /// fails; the session then waits in AwaitingGrading for a retry.
    pub async fn dispatch(
        &self,
        session: &mut ExamSession,
        command: ExamCommand,
    ) -> Result<Vec<ExamEffect>, SessionError> {
        let effects = session.dispatch(command)?;
        let mut applied = Vec::with_capacity(effects.len());
        for effect in effects {
            let follow_up = match &effect {
                ExamEffect::RequestGrading(ticket) => self.grade(session, ticket).await?,
                _ => Vec::new(),
            };
            applied.push(effect);
            applied.extend(follow_up);
        }
        Ok(applied)
    }

    /// Send one grading ticket and complete it on the session.
    ///
    /// # Errors
    ///
    /// Returns `StaleResponse` if the session moved on meanwhile and
    /// `GradingUnavailable` if grading failed.
    pub async fn grade(
        &self,
        session: &mut ExamSession,
        ticket: &GradingTicket,
    ) -> Result<Vec<ExamEffect>, SessionError> {
        let outcome = self.grading.grade(ticket).await;
        session.complete_grading(ticket.ticket(), outcome)
    }

    /// # Errors
    ///
    /// Same as `dispatch` with `ExamCommand::RetryGrading`.
    pub async fn retry_grading(
        &self,
        session: &mut ExamSession,
    ) -> Result<Vec<ExamEffect>, SessionError> {
        self.dispatch(session, ExamCommand::RetryGrading).await
    }
}
