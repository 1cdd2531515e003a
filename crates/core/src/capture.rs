//! Per-question selection state.
//!
//! A capture is created when a question is shown and dropped when the next one
//! loads. It knows nothing about rendering; callers read `is_selected` to
//! highlight choices.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::model::{CanonicalAnswer, OptionId, Question, QuestionKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CaptureError {
    #[error("option {id} does not exist (question has {available} choices)")]
    UnknownOption { id: OptionId, available: usize },

    #[error("answer already submitted for this question")]
    Locked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerCapture {
    kind: QuestionKind,
    values: Vec<String>,
    selected: BTreeSet<OptionId>,
    locked: bool,
}

impl AnswerCapture {
    #[must_use]
    pub fn new(question: &Question) -> Self {
        Self {
            kind: question.kind(),
            values: question
                .choices()
                .iter()
                .map(|choice| choice.value().to_owned())
                .collect(),
            selected: BTreeSet::new(),
            locked: false,
        }
    }

    /// Apply one selection event.
    ///
    /// Single and judge questions replace the selection; multiple-choice
    /// questions flip membership of the option.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::Locked` after submission and
    /// `CaptureError::UnknownOption` for ids outside the choice list.
    pub fn select(&mut self, id: OptionId) -> Result<(), CaptureError> {
        if self.locked {
            return Err(CaptureError::Locked);
        }
        if id.index() >= self.values.len() {
            return Err(CaptureError::UnknownOption {
                id,
                available: self.values.len(),
            });
        }

        if self.kind.is_exclusive() {
            self.selected.clear();
            self.selected.insert(id);
        } else if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
        Ok(())
    }

    #[must_use]
    pub fn is_selected(&self, id: OptionId) -> bool {
        self.selected.contains(&id)
    }

    /// Submit is allowed iff something is selected.
    #[must_use]
    pub fn is_answerable(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Canonical encoding of the current selection, `None` when empty.
    #[must_use]
    pub fn canonical_answer(&self) -> Option<CanonicalAnswer> {
        if !self.is_answerable() {
            return None;
        }
        Some(CanonicalAnswer::from_values(
            self.selected
                .iter()
                .map(|id| self.values[id.index()].as_str()),
        ))
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{JUDGE_FALSE_LABEL, QuestionDraft};

    fn question(kind: &str, options: &[&str], answer: &str) -> Question {
        QuestionDraft {
            id: 1,
            kind: kind.to_owned(),
            prompt: "Q".to_owned(),
            options: options.iter().map(|o| (*o).to_owned()).collect(),
            correct_answer: answer.to_owned(),
            max_score: 5.0,
            explanation: String::new(),
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn multiple_choice_is_order_independent() {
        let q = question("multiple", &["A..", "B..", "C.."], "AC");

        let mut first = AnswerCapture::new(&q);
        first.select(OptionId::new(2)).unwrap();
        first.select(OptionId::new(0)).unwrap();

        let mut second = AnswerCapture::new(&q);
        second.select(OptionId::new(0)).unwrap();
        second.select(OptionId::new(2)).unwrap();

        assert_eq!(first.canonical_answer(), second.canonical_answer());
        assert_eq!(first.canonical_answer().unwrap(), *q.correct_answer());
    }

    #[test]
    fn multiple_choice_toggles() {
        let q = question("multiple", &["A..", "B.."], "A");
        let mut capture = AnswerCapture::new(&q);
        capture.select(OptionId::new(1)).unwrap();
        capture.select(OptionId::new(1)).unwrap();
        assert!(!capture.is_answerable());
        assert_eq!(capture.canonical_answer(), None);
    }

    #[test]
    fn single_choice_is_exclusive() {
        let q = question("single", &["A. Paris", "B. Lyon"], "A");
        let mut capture = AnswerCapture::new(&q);
        capture.select(OptionId::new(1)).unwrap();
        capture.select(OptionId::new(0)).unwrap();
        assert!(capture.is_selected(OptionId::new(0)));
        assert!(!capture.is_selected(OptionId::new(1)));
        assert_eq!(capture.canonical_answer().unwrap().as_str(), "A");

        capture.select(OptionId::new(0)).unwrap();
        assert!(capture.is_answerable());
    }

    #[test]
    fn judge_encodes_fixed_label() {
        let q = question("judge", &[], "F");
        let mut capture = AnswerCapture::new(&q);
        capture.select(OptionId::new(0)).unwrap();
        capture.select(OptionId::new(1)).unwrap();
        assert_eq!(capture.canonical_answer().unwrap().as_str(), JUDGE_FALSE_LABEL);
    }

    #[test]
    fn rejects_unknown_option_and_locked_selection() {
        let q = question("judge", &[], "T");
        let mut capture = AnswerCapture::new(&q);
        let err = capture.select(OptionId::new(2)).unwrap_err();
        assert_eq!(
            err,
            CaptureError::UnknownOption {
                id: OptionId::new(2),
                available: 2
            }
        );

        capture.select(OptionId::new(0)).unwrap();
        capture.lock();
        assert_eq!(capture.select(OptionId::new(1)), Err(CaptureError::Locked));
        assert!(capture.is_selected(OptionId::new(0)));
    }
}
