use services::ExamSession;

use crate::vm::time_fmt::{format_datetime, format_elapsed, format_score};

const NOT_ANSWERED_LABEL: &str = "Not answered";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultsVm {
    pub score_label: String,
    pub correct_label: String,
    pub wrong_label: String,
    pub accuracy_label: String,
    pub graded_at_str: Option<String>,
    /// Time from starting the exam to receiving the grade.
    pub elapsed_label: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailRowVm {
    pub number_label: String,
    pub prompt: String,
    pub user_answer_label: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub score_label: String,
    pub explanation: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailsVm {
    pub rows: Vec<DetailRowVm>,
}

/// Summary figures as reported by the grader; empty labels before grading.
#[must_use]
pub fn map_results(session: &ExamSession) -> ResultsVm {
    let graded_at_str = session.graded_at().map(format_datetime);
    let elapsed_label = session
        .started_at()
        .zip(session.graded_at())
        .map(|(started, graded)| format_elapsed(graded - started));
    let Some(report) = session.report() else {
        return ResultsVm {
            score_label: String::new(),
            correct_label: String::new(),
            wrong_label: String::new(),
            accuracy_label: String::new(),
            graded_at_str,
            elapsed_label,
        };
    };
    let summary = &report.summary;
    ResultsVm {
        score_label: format!(
            "{} / {}",
            format_score(summary.total_score()),
            format_score(summary.max_score())
        ),
        correct_label: format!("{} correct", summary.correct_count()),
        wrong_label: format!("{} wrong", summary.wrong_count()),
        accuracy_label: format!("{:.1}%", summary.accuracy_rate()),
        graded_at_str,
        elapsed_label,
    }
}

/// One row per graded question, in question order.
#[must_use]
pub fn map_details(session: &ExamSession) -> DetailsVm {
    let Some(report) = session.report() else {
        return DetailsVm { rows: Vec::new() };
    };
    let rows = report
        .results
        .iter()
        .enumerate()
        .map(|(index, result)| DetailRowVm {
            number_label: format!("Q{}", index + 1),
            prompt: session
                .questions()
                .get(index)
                .map(|question| question.prompt().to_owned())
                .unwrap_or_default(),
            user_answer_label: if result.is_unanswered() {
                NOT_ANSWERED_LABEL.to_owned()
            } else {
                result.user_answer.clone()
            },
            correct_answer: result.correct_answer.clone(),
            is_correct: result.is_correct,
            score_label: format!(
                "{}/{}",
                format_score(result.score),
                format_score(result.max_score)
            ),
            explanation: result.explanation.clone(),
        })
        .collect();
    DetailsVm { rows }
}
