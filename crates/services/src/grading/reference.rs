use async_trait::async_trait;

use exam_core::model::{JUDGE_FALSE_LABEL, JudgeAnswer, QuestionDraft, QuestionKind};

use crate::error::GradingError;
use crate::grading::{GradedQuestion, Grader, GradingRequest, GradingResponse};

/// In-process grader applying the backend's scoring rules.
///
/// - judge answers are normalized to the canonical labels; an unrecognized
///   correct answer counts as false
/// - multiple-choice answers are compared with their letters sorted
/// - a correct answer earns the full score, anything else earns zero
/// - accuracy is `correct / total * 100`, or 0 for an empty set
#[derive(Clone, Copy, Debug, Default)]
pub struct ReferenceGrader;

impl ReferenceGrader {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn grade_request(&self, request: &GradingRequest) -> GradingResponse {
        let results: Vec<GradedQuestion> = request
            .questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let user_answer = request
                    .user_answers
                    .get(index)
                    .map(String::as_str)
                    .unwrap_or_default();
                grade_question(question, user_answer)
            })
            .collect();

        let total_score: f64 = results.iter().map(|r| r.score).sum();
        let max_score: f64 = request.questions.iter().map(|q| q.max_score).sum();
        let correct_count = results.iter().filter(|r| r.is_correct).count();
        let total_questions = request.questions.len();
        let accuracy_rate = if total_questions == 0 {
            0.0
        } else {
            correct_count as f64 / total_questions as f64 * 100.0
        };

        GradingResponse {
            success: true,
            results,
            total_score,
            max_score,
            correct_count,
            total_questions,
            accuracy_rate,
            error: None,
        }
    }
}

fn grade_question(question: &QuestionDraft, user_answer: &str) -> GradedQuestion {
    let kind = question.kind.parse::<QuestionKind>().ok();
    let (user_answer, correct_answer) = match kind {
        Some(QuestionKind::Judge) => {
            let correct = match JudgeAnswer::parse(&question.correct_answer) {
                Some(JudgeAnswer::True) => JudgeAnswer::True.label(),
                _ => JUDGE_FALSE_LABEL,
            };
            let user = JudgeAnswer::parse(user_answer)
                .map_or_else(|| user_answer.to_owned(), |judge| judge.label().to_owned());
            (user, correct.to_owned())
        }
        Some(QuestionKind::Multiple) => (
            sorted_letters(user_answer),
            sorted_letters(&question.correct_answer),
        ),
        _ => (user_answer.to_owned(), question.correct_answer.clone()),
    };

    let is_correct = user_answer == correct_answer;
    GradedQuestion {
        question_id: question.id,
        user_answer,
        correct_answer,
        is_correct,
        score: if is_correct { question.max_score } else { 0.0 },
        max_score: question.max_score,
        explanation: question.explanation.clone(),
    }
}

fn sorted_letters(raw: &str) -> String {
    let mut chars: Vec<char> = raw.chars().collect();
    chars.sort_unstable();
    chars.into_iter().collect()
}

#[async_trait]
impl Grader for ReferenceGrader {
    async fn grade(&self, request: &GradingRequest) -> Result<GradingResponse, GradingError> {
        Ok(self.grade_request(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(id: u64, kind: &str, answer: &str, score: f64) -> QuestionDraft {
        QuestionDraft {
            id,
            kind: kind.into(),
            prompt: format!("{id}."),
            options: vec!["A. a".into(), "B. b".into(), "C. c".into()],
            correct_answer: answer.into(),
            max_score: score,
            explanation: String::new(),
        }
    }

    #[test]
    fn grades_each_kind() {
        let request = GradingRequest {
            questions: vec![
                draft(1, "single", "A", 10.0),
                draft(2, "multiple", "CA", 20.0),
                draft(3, "judge", "对", 5.0),
            ],
            user_answers: vec!["A".into(), "AC".into(), "true".into()],
        };
        let response = ReferenceGrader::new().grade_request(&request);
        assert!(response.success);
        assert_eq!(response.correct_count, 3);
        assert_eq!(response.total_score, 35.0);
        assert_eq!(response.accuracy_rate, 100.0);
        assert_eq!(response.results[1].correct_answer, "AC");
        assert_eq!(response.results[2].user_answer, "正确");
    }

    #[test]
    fn unanswered_scores_zero() {
        let request = GradingRequest {
            questions: vec![draft(1, "single", "A", 10.0), draft(2, "single", "B", 10.0)],
            user_answers: vec!["A".into()],
        };
        let response = ReferenceGrader::new().grade_request(&request);
        assert_eq!(response.correct_count, 1);
        assert_eq!(response.results[1].user_answer, "");
        assert_eq!(response.results[1].score, 0.0);
        assert_eq!(response.accuracy_rate, 50.0);
        assert_eq!(response.max_score, 20.0);
    }

    #[test]
    fn unrecognized_judge_answer_counts_as_false() {
        let request = GradingRequest {
            questions: vec![draft(1, "judge", "maybe", 5.0)],
            user_answers: vec!["错".into()],
        };
        let response = ReferenceGrader::new().grade_request(&request);
        assert!(response.results[0].is_correct);
    }

    #[test]
    fn empty_request_has_zero_accuracy() {
        let request = GradingRequest {
            questions: Vec::new(),
            user_answers: Vec::new(),
        };
        let response = ReferenceGrader::new().grade_request(&request);
        assert_eq!(response.accuracy_rate, 0.0);
        assert!(response.results.is_empty());
    }
}
