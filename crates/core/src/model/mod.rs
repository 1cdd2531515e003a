mod answer;
mod grading;
mod ids;
mod question;

pub use answer::CanonicalAnswer;
pub use grading::{GradingReport, GradingResult, SessionSummary, SummaryError};
pub use ids::{AttemptId, Generation, OptionId, QuestionId};
pub use question::{
    Choice, JUDGE_FALSE_LABEL, JUDGE_TRUE_LABEL, JudgeAnswer, MalformedQuestionError,
    OptionLetter, Question, QuestionDraft, QuestionKind, QuestionSetError, parse_option_letter,
    validate_question_set,
};
