use exam_core::model::{OptionId, QuestionKind};
use services::{ExamPhase, ExamSession};

use crate::vm::results_vm::{DetailsVm, ResultsVm, map_details, map_results};
use crate::vm::time_fmt::format_score;

const NEXT_QUESTION_LABEL: &str = "Next question";
const VIEW_RESULTS_LABEL: &str = "View results";

/// Everything one screen of the exam needs, derived from the session.
#[derive(Clone, Debug, PartialEq)]
pub enum ExamScreen {
    Upload(UploadVm),
    Question(QuestionVm),
    Grading(GradingVm),
    Results(ResultsVm),
    Details(DetailsVm),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadVm {
    /// e.g. "3 questions, 20 points" once a document is loaded.
    pub document_label: Option<String>,
    pub is_uploading: bool,
    pub can_start: bool,
    pub failure: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionMark {
    Unmarked,
    Correct,
    Wrong,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub id: OptionId,
    pub label: String,
    pub selected: bool,
    pub mark: OptionMark,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackVm {
    pub is_correct: bool,
    pub verdict_label: String,
    pub correct_answer_label: String,
    pub explanation: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuestionVm {
    pub counter_label: String,
    pub progress_percent: f64,
    pub score_label: String,
    pub kind_label: &'static str,
    pub prompt: String,
    pub options: Vec<OptionVm>,
    pub can_submit: bool,
    pub feedback: Option<FeedbackVm>,
    /// Only present after the current answer was recorded.
    pub next_label: Option<&'static str>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GradingVm {
    pub answered_label: String,
    pub is_pending: bool,
    pub failure: Option<String>,
}

fn kind_label(kind: QuestionKind) -> &'static str {
    match kind {
        QuestionKind::Single => "Single choice",
        QuestionKind::Multiple => "Multiple choice",
        QuestionKind::Judge => "True or false",
    }
}

#[must_use]
pub fn map_exam_screen(session: &ExamSession) -> ExamScreen {
    match session.phase() {
        ExamPhase::Idle => ExamScreen::Upload(map_upload(session)),
        ExamPhase::InProgress => match map_question(session) {
            Some(vm) => ExamScreen::Question(vm),
            None => ExamScreen::Upload(map_upload(session)),
        },
        ExamPhase::AwaitingGrading => ExamScreen::Grading(map_grading(session)),
        ExamPhase::ShowingResults => ExamScreen::Results(map_results(session)),
        ExamPhase::ShowingDetails => ExamScreen::Details(map_details(session)),
    }
}

fn map_upload(session: &ExamSession) -> UploadVm {
    let document_label = session.document().map(|document| {
        format!(
            "{} questions, {} points",
            document.stats.total_questions,
            format_score(document.stats.total_score)
        )
    });
    let is_uploading = session.pending().is_some();
    UploadVm {
        can_start: document_label.is_some() && !is_uploading,
        document_label,
        is_uploading,
        failure: session.last_failure().map(str::to_owned),
    }
}

fn map_question(session: &ExamSession) -> Option<QuestionVm> {
    let question = session.current_question()?;
    let capture = session.capture()?;
    let progress = session.progress();
    let feedback = session.current_feedback();
    let submitted = feedback.is_some();

    let options = question
        .choices()
        .iter()
        .enumerate()
        .map(|(index, choice)| {
            let id = OptionId::new(index);
            let selected = capture.is_selected(id);
            let mark = if !submitted {
                OptionMark::Unmarked
            } else if question.is_correct_choice(id) {
                OptionMark::Correct
            } else if selected {
                OptionMark::Wrong
            } else {
                OptionMark::Unmarked
            };
            OptionVm {
                id,
                label: choice.label().to_owned(),
                selected,
                mark,
            }
        })
        .collect();

    let next_label = submitted.then_some(if progress.is_last {
        VIEW_RESULTS_LABEL
    } else {
        NEXT_QUESTION_LABEL
    });

    Some(QuestionVm {
        counter_label: format!("Question {} / {}", progress.current + 1, progress.total),
        progress_percent: progress.percent(),
        score_label: format!("Score: {}", format_score(session.running_score())),
        kind_label: kind_label(question.kind()),
        prompt: question.prompt().to_owned(),
        options,
        can_submit: !capture.is_locked() && capture.is_answerable(),
        feedback: feedback.map(|feedback| FeedbackVm {
            is_correct: feedback.is_correct,
            verdict_label: if feedback.is_correct {
                "Correct".to_owned()
            } else {
                "Incorrect".to_owned()
            },
            correct_answer_label: format!("Correct answer: {}", feedback.correct_answer),
            explanation: feedback.explanation,
        }),
        next_label,
    })
}

fn map_grading(session: &ExamSession) -> GradingVm {
    let progress = session.progress();
    GradingVm {
        answered_label: format!("{} of {} answered", progress.answered, progress.total),
        is_pending: session.pending().is_some(),
        failure: session.last_failure().map(str::to_owned),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{Question, QuestionDraft};
    use exam_core::time::fixed_clock;
    use services::{ExamCommand, ExamEffect, GradingError};

    fn question(id: u64, kind: &str, options: &[&str], answer: &str) -> Question {
        QuestionDraft {
            id,
            kind: kind.into(),
            prompt: format!("{id}. prompt"),
            options: options.iter().map(|o| (*o).to_owned()).collect(),
            correct_answer: answer.into(),
            max_score: 10.0,
            explanation: "because".into(),
        }
        .validate()
        .unwrap()
    }

    fn started() -> ExamSession {
        let mut session = ExamSession::new(fixed_clock());
        session
            .start_exam(vec![
                question(1, "multiple", &["A. 2", "B. 4", "C. 5"], "AC"),
                question(2, "judge", &[], "T"),
            ])
            .unwrap();
        session
    }

    fn question_vm(session: &ExamSession) -> QuestionVm {
        match map_exam_screen(session) {
            ExamScreen::Question(vm) => vm,
            other => panic!("expected question screen, got {other:?}"),
        }
    }

    #[test]
    fn idle_session_shows_upload() {
        let session = ExamSession::default();
        let ExamScreen::Upload(vm) = map_exam_screen(&session) else {
            panic!("expected upload screen");
        };
        assert!(!vm.can_start);
        assert_eq!(vm.document_label, None);
    }

    #[test]
    fn fresh_question_has_no_marks() {
        let session = started();
        let vm = question_vm(&session);
        assert_eq!(vm.counter_label, "Question 1 / 2");
        assert_eq!(vm.kind_label, "Multiple choice");
        assert_eq!(vm.score_label, "Score: 0");
        assert!(!vm.can_submit);
        assert_eq!(vm.next_label, None);
        assert!(vm.options.iter().all(|o| o.mark == OptionMark::Unmarked));
    }

    #[test]
    fn submitted_question_marks_correct_and_wrong() {
        let mut session = started();
        session.select(OptionId::new(0)).unwrap();
        session.select(OptionId::new(1)).unwrap();
        assert!(question_vm(&session).can_submit);
        session.submit().unwrap();

        let vm = question_vm(&session);
        let marks: Vec<_> = vm.options.iter().map(|o| o.mark).collect();
        assert_eq!(
            marks,
            vec![OptionMark::Correct, OptionMark::Wrong, OptionMark::Correct]
        );
        let feedback = vm.feedback.unwrap();
        assert!(!feedback.is_correct);
        assert_eq!(feedback.correct_answer_label, "Correct answer: AC");
        assert_eq!(vm.next_label, Some("Next question"));
        assert!(!vm.can_submit);
    }

    #[test]
    fn last_question_offers_results() {
        let mut session = started();
        session.select(OptionId::new(0)).unwrap();
        session.submit().unwrap();
        session.advance().unwrap();
        session.select(OptionId::new(0)).unwrap();
        session.submit().unwrap();

        let vm = question_vm(&session);
        assert_eq!(vm.kind_label, "True or false");
        assert_eq!(vm.options[0].label, "正确");
        assert_eq!(vm.next_label, Some("View results"));
        assert_eq!(vm.score_label, "Score: 10");
    }

    #[test]
    fn grading_failure_is_shown_while_waiting() {
        let mut session = ExamSession::new(fixed_clock());
        session.start_exam(vec![question(1, "judge", &[], "F")]).unwrap();
        session.select(OptionId::new(1)).unwrap();
        session.submit().unwrap();
        let effects = session.dispatch(ExamCommand::Advance).unwrap();
        let Some(ExamEffect::RequestGrading(ticket)) = effects.into_iter().next() else {
            panic!("expected grading request");
        };
        let _ = session.complete_grading(
            ticket.ticket(),
            Err(GradingError::Rejected("offline".into())),
        );

        let ExamScreen::Grading(vm) = map_exam_screen(&session) else {
            panic!("expected grading screen");
        };
        assert_eq!(vm.answered_label, "1 of 1 answered");
        assert!(!vm.is_pending);
        assert!(vm.failure.unwrap().contains("offline"));
    }
}
