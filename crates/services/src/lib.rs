#![forbid(unsafe_code)]

pub mod config;
pub mod document;
pub mod error;
pub mod exam;
pub mod grading;

pub use exam_core::Clock;

pub use config::ExamConfig;
pub use error::{
    ConfigError, DocumentNameError, ErrorClass, GradingError, ParserError, SessionError,
};

pub use document::{DocumentParser, DocumentStats, HttpDocumentParser, ParsedDocument};
pub use exam::{
    AnswerFeedback, ExamCommand, ExamEffect, ExamLoopService, ExamPhase, ExamProgress,
    ExamSession, GradingTicket, RequestTicket,
};
pub use grading::{Grader, GradingAdapter, HttpGrader, ReferenceGrader};
