//! Wire contract with the grading authority.

use serde::{Deserialize, Serialize};

use exam_core::model::{
    CanonicalAnswer, GradingReport, GradingResult, Question, QuestionDraft, QuestionId,
    SessionSummary,
};

use crate::error::GradingError;

/// Full question + answer snapshot, positionally aligned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingRequest {
    pub questions: Vec<QuestionDraft>,
    pub user_answers: Vec<String>,
}

impl GradingRequest {
    /// Build the request from a session snapshot.
    ///
    /// Missing answers are sent as `""` (unanswered) so both sequences have the
    /// same length; answers beyond the last question are dropped.
    #[must_use]
    pub fn from_snapshot(questions: &[Question], answers: &[CanonicalAnswer]) -> Self {
        let user_answers = (0..questions.len())
            .map(|index| {
                answers
                    .get(index)
                    .map(|answer| answer.as_str().to_owned())
                    .unwrap_or_default()
            })
            .collect();
        Self {
            questions: questions.iter().map(Question::to_draft).collect(),
            user_answers,
        }
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

/// One graded question as reported by the grader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedQuestion {
    pub question_id: u64,
    #[serde(default)]
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub score: f64,
    pub max_score: f64,
    #[serde(default)]
    pub explanation: String,
}

/// Body returned by the grader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub results: Vec<GradedQuestion>,
    #[serde(default)]
    pub total_score: f64,
    #[serde(default)]
    pub max_score: f64,
    #[serde(default)]
    pub correct_count: usize,
    #[serde(default)]
    pub total_questions: usize,
    #[serde(default)]
    pub accuracy_rate: f64,
    #[serde(default)]
    pub error: Option<String>,
}

impl GradingResponse {
    /// Interpret the response for a request with `expected` questions.
    ///
    /// No score is recomputed here; the grader's figures are taken as they are.
    ///
    /// # Errors
    ///
    /// Returns `GradingError::Rejected` if the grader reported failure,
    /// `GradingError::ResultCountMismatch` if results do not line up with the
    /// questions, and `GradingError::Summary` for an inconsistent summary.
    pub fn into_report(self, expected: usize) -> Result<GradingReport, GradingError> {
        if !self.success {
            let message = self
                .error
                .unwrap_or_else(|| "grader reported failure".into());
            return Err(GradingError::Rejected(message));
        }
        if self.results.len() != expected {
            return Err(GradingError::ResultCountMismatch {
                expected,
                got: self.results.len(),
            });
        }

        let summary = SessionSummary::new(
            self.total_score,
            self.max_score,
            self.total_questions,
            self.correct_count,
            self.accuracy_rate,
        )?;
        let results = self
            .results
            .into_iter()
            .map(|graded| GradingResult {
                question_id: QuestionId::new(graded.question_id),
                user_answer: graded.user_answer,
                correct_answer: graded.correct_answer,
                is_correct: graded.is_correct,
                score: graded.score,
                max_score: graded.max_score,
                explanation: Some(graded.explanation).filter(|e| !e.trim().is_empty()),
            })
            .collect();

        Ok(GradingReport { summary, results })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::QuestionDraft;

    fn single(id: u64) -> Question {
        QuestionDraft {
            id,
            kind: "single".into(),
            prompt: format!("{id}. ?"),
            options: vec!["A. x".into(), "B. y".into()],
            correct_answer: "B".into(),
            max_score: 10.0,
            explanation: String::new(),
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn snapshot_pads_missing_answers() {
        let questions = vec![single(1), single(2), single(3)];
        let answers = vec![CanonicalAnswer::from_values(["B"])];
        let request = GradingRequest::from_snapshot(&questions, &answers);
        assert_eq!(request.user_answers, vec!["B", "", ""]);
        assert_eq!(request.question_count(), 3);
    }

    #[test]
    fn request_uses_wire_field_names() {
        let request = GradingRequest::from_snapshot(&[single(1)], &[]);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["user_answers"][0], "");
        assert_eq!(json["questions"][0]["type"], "single");
        assert_eq!(json["questions"][0]["answer"], "B");
        assert_eq!(json["questions"][0]["score"], 10.0);
    }

    #[test]
    fn response_maps_to_report() {
        let json = r#"{"success":true,"total_score":10,"max_score":20,"correct_count":1,
            "total_questions":2,"accuracy_rate":50.0,"results":[
              {"question_id":1,"user_answer":"B","correct_answer":"B","is_correct":true,"score":10,"max_score":10,"explanation":"because"},
              {"question_id":2,"user_answer":"","correct_answer":"B","is_correct":false,"score":0,"max_score":10,"explanation":""}
            ]}"#;
        let response: GradingResponse = serde_json::from_str(json).unwrap();
        let report = response.into_report(2).unwrap();
        assert_eq!(report.summary.correct_count(), 1);
        assert_eq!(report.summary.accuracy_rate(), 50.0);
        assert_eq!(report.results[0].explanation.as_deref(), Some("because"));
        assert!(report.results[1].is_unanswered());
        assert_eq!(report.results[1].explanation, None);
    }

    #[test]
    fn rejects_result_count_mismatch() {
        let response = GradingResponse {
            success: true,
            results: Vec::new(),
            total_score: 0.0,
            max_score: 0.0,
            correct_count: 0,
            total_questions: 1,
            accuracy_rate: 0.0,
            error: None,
        };
        let err = response.into_report(1).unwrap_err();
        assert!(matches!(
            err,
            GradingError::ResultCountMismatch {
                expected: 1,
                got: 0
            }
        ));
    }

    #[test]
    fn failure_surfaces_grader_message() {
        let response: GradingResponse =
            serde_json::from_str(r#"{"error":"提交处理失败: boom"}"#).unwrap();
        let err = response.into_report(0).unwrap_err();
        assert!(matches!(err, GradingError::Rejected(msg) if msg.contains("boom")));
    }
}
