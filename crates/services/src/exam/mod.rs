mod dispatch;
mod progress;
mod session;
mod ticket;
mod workflow;

// Public API of the exam subsystem.
pub use crate::error::SessionError;
pub use dispatch::{AnswerFeedback, ExamCommand, ExamEffect};
pub use progress::ExamProgress;
pub use session::{ExamPhase, ExamSession};
pub use ticket::{GradingTicket, RequestKind, RequestTicket};
pub use workflow::ExamLoopService;
