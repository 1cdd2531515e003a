use serde::{Deserialize, Serialize};

use exam_core::model::{Question, QuestionDraft, validate_question_set};

use crate::error::ParserError;

/// Body returned by the document parser service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub questions: Vec<QuestionDraft>,
    #[serde(default)]
    pub total_questions: usize,
    #[serde(default)]
    pub total_score: f64,
    #[serde(default)]
    pub error: Option<String>,
}

impl ParseResponse {
    /// Validate the parsed questions into a loadable document.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::Rejected` when the service reported failure and
    /// `ParserError::MalformedQuestions` when any question is malformed.
    pub fn into_document(self) -> Result<ParsedDocument, ParserError> {
        if !self.success {
            let message = self
                .error
                .unwrap_or_else(|| "document parser reported failure".into());
            return Err(ParserError::Rejected(message));
        }
        let questions = validate_question_set(self.questions)?;
        Ok(ParsedDocument {
            questions,
            stats: DocumentStats {
                total_questions: self.total_questions,
                total_score: self.total_score,
            },
        })
    }
}

/// Counts reported by the parser alongside the questions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentStats {
    pub total_questions: usize,
    pub total_score: f64,
}

/// A validated question set ready to start an exam with.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub questions: Vec<Question>,
    pub stats: DocumentStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_response_becomes_document() {
        let json = r#"{"success":true,"total_questions":2,"total_score":15,
            "questions":[
              {"id":1,"type":"single","question":"1. Capital?","options":["A. Paris","B. Lyon"],"answer":"A","score":10,"explanation":""},
              {"id":2,"type":"judge","question":"2. Sky is blue","options":["正确","错误"],"answer":"对","score":5,"explanation":""}
            ]}"#;
        let response: ParseResponse = serde_json::from_str(json).unwrap();
        let document = response.into_document().unwrap();
        assert_eq!(document.questions.len(), 2);
        assert_eq!(document.stats.total_questions, 2);
        assert_eq!(document.stats.total_score, 15.0);
    }

    #[test]
    fn failure_carries_service_message() {
        let json = r#"{"error":"没有文件被上传"}"#;
        let response: ParseResponse = serde_json::from_str(json).unwrap();
        let err = response.into_document().unwrap_err();
        assert!(matches!(err, ParserError::Rejected(msg) if msg == "没有文件被上传"));
    }

    #[test]
    fn malformed_question_rejects_document() {
        let json = r#"{"success":true,"questions":[
              {"id":1,"type":"single","question":"1. ?","options":["A. x"],"answer":"Z","score":10}
            ]}"#;
        let response: ParseResponse = serde_json::from_str(json).unwrap();
        let err = response.into_document().unwrap_err();
        assert!(matches!(err, ParserError::MalformedQuestions(e) if e.index == 0));
    }
}
