use exam_core::model::{AttemptId, Generation};

use crate::grading::GradingRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Upload,
    Grading,
}

/// Handle for the single outstanding collaborator call of a session.
///
/// A completion is only applied when its ticket still matches the session's
/// generation and outstanding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    generation: Generation,
    kind: RequestKind,
}

impl RequestTicket {
    pub(crate) fn new(generation: Generation, kind: RequestKind) -> Self {
        Self { generation, kind }
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub fn kind(&self) -> RequestKind {
        self.kind
    }
}

/// A grading request together with the ticket to complete it with.
#[derive(Debug, Clone, PartialEq)]
pub struct GradingTicket {
    ticket: RequestTicket,
    attempt: AttemptId,
    request: GradingRequest,
}

impl GradingTicket {
    pub(crate) fn new(ticket: RequestTicket, attempt: AttemptId, request: GradingRequest) -> Self {
        Self {
            ticket,
            attempt,
            request,
        }
    }

    #[must_use]
    pub fn ticket(&self) -> RequestTicket {
        self.ticket
    }

    #[must_use]
    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    #[must_use]
    pub fn request(&self) -> &GradingRequest {
        &self.request
    }
}
