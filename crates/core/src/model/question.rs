use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::answer::CanonicalAnswer;
use crate::model::ids::{OptionId, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum MalformedQuestionError {
    #[error("unknown question type: {0:?}")]
    UnknownKind(String),

    #[error("max score must be a non-negative number, got {0}")]
    NegativeScore(f64),

    #[error("choice questions need at least one option")]
    NoOptions,

    #[error("option {position} has no leading letter: {text:?}")]
    UnlabeledOption { position: usize, text: String },

    #[error("option letter {0} appears more than once")]
    DuplicateOptionLetter(OptionLetter),

    #[error("correct answer is missing")]
    MissingAnswer,

    #[error("correct answer {0:?} is not a letter sequence")]
    InvalidAnswer(String),

    #[error("correct answer references option {0}, which does not exist")]
    UnknownAnswerLetter(OptionLetter),

    #[error("single choice questions take exactly one answer letter, got {count}")]
    SingleAnswerExpected { count: usize },

    #[error("judge answer {0:?} is neither true nor false")]
    UnknownJudgeAnswer(String),
}

/// A question set rejected because one of its questions is malformed.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("question {index} is malformed: {source}")]
pub struct QuestionSetError {
    pub index: usize,
    #[source]
    pub source: MalformedQuestionError,
}

//
// ─── QUESTION KIND ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionKind {
    Single,
    Multiple,
    Judge,
}

impl QuestionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::Single => "single",
            QuestionKind::Multiple => "multiple",
            QuestionKind::Judge => "judge",
        }
    }

    /// Whether selecting one choice clears the others.
    #[must_use]
    pub fn is_exclusive(self) -> bool {
        !matches!(self, QuestionKind::Multiple)
    }
}

impl FromStr for QuestionKind {
    type Err = MalformedQuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "single" => Ok(Self::Single),
            "multiple" => Ok(Self::Multiple),
            "judge" => Ok(Self::Judge),
            other => Err(MalformedQuestionError::UnknownKind(other.to_owned())),
        }
    }
}

//
// ─── OPTION LETTERS ────────────────────────────────────────────────────────────
//

const LETTER_SEPARATORS: [char; 7] = ['.', '．', '、', ')', '）', ':', '：'];

/// Upper-case ASCII letter labelling a choice ("A" in "A. Paris").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionLetter(char);

impl OptionLetter {
    #[must_use]
    pub fn new(letter: char) -> Option<Self> {
        letter.is_ascii_uppercase().then_some(Self(letter))
    }

    #[must_use]
    pub fn as_char(self) -> char {
        self.0
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Extract the letter an option text is labelled with.
///
/// The text (ignoring leading whitespace) must start with an upper-case ASCII
/// letter followed by a separator (`.`, `．`, `、`, `)`, `）`, `:`, `：`), by
/// whitespace, or by nothing at all.
#[must_use]
pub fn parse_option_letter(text: &str) -> Option<OptionLetter> {
    let mut chars = text.trim_start().chars();
    let letter = OptionLetter::new(chars.next()?)?;
    match chars.next() {
        None => Some(letter),
        Some(next) if next.is_whitespace() || LETTER_SEPARATORS.contains(&next) => Some(letter),
        Some(_) => None,
    }
}

//
// ─── JUDGE DOMAIN ──────────────────────────────────────────────────────────────
//

pub const JUDGE_TRUE_LABEL: &str = "正确";
pub const JUDGE_FALSE_LABEL: &str = "错误";

const JUDGE_TRUE_ALIASES: [&str; 7] = ["正确", "正確", "true", "t", "对", "對", "√"];
const JUDGE_FALSE_ALIASES: [&str; 7] = ["错误", "錯誤", "false", "f", "错", "錯", "×"];

/// The fixed two-value domain of judge (true/false) questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JudgeAnswer {
    True,
    False,
}

impl JudgeAnswer {
    /// Rendering order: true first.
    pub const ALL: [JudgeAnswer; 2] = [JudgeAnswer::True, JudgeAnswer::False];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            JudgeAnswer::True => JUDGE_TRUE_LABEL,
            JudgeAnswer::False => JUDGE_FALSE_LABEL,
        }
    }

    /// Normalize any accepted spelling of true/false.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if JUDGE_TRUE_ALIASES.contains(&normalized.as_str()) {
            Some(JudgeAnswer::True)
        } else if JUDGE_FALSE_ALIASES.contains(&normalized.as_str()) {
            Some(JudgeAnswer::False)
        } else {
            None
        }
    }
}

//
// ─── DRAFT (WIRE SHAPE) ────────────────────────────────────────────────────────
//

/// Unvalidated question as exchanged with the parser and grader services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDraft {
    #[serde(default)]
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "question")]
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(rename = "answer", default)]
    pub correct_answer: String,
    #[serde(rename = "score")]
    pub max_score: f64,
    #[serde(default)]
    pub explanation: String,
}

impl QuestionDraft {
    /// Validate the draft into an immutable `Question`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedQuestionError` if the type is unknown, the score is
    /// negative, the options are unusable, or the correct answer does not fit
    /// the options.
    pub fn validate(self) -> Result<Question, MalformedQuestionError> {
        let kind: QuestionKind = self.kind.parse()?;

        if !self.max_score.is_finite() || self.max_score < 0.0 {
            return Err(MalformedQuestionError::NegativeScore(self.max_score));
        }
        if self.correct_answer.trim().is_empty() {
            return Err(MalformedQuestionError::MissingAnswer);
        }

        let (options, choices, correct_answer) = match kind {
            QuestionKind::Judge => {
                let answer = JudgeAnswer::parse(&self.correct_answer).ok_or_else(|| {
                    MalformedQuestionError::UnknownJudgeAnswer(self.correct_answer.clone())
                })?;
                let choices = JudgeAnswer::ALL
                    .iter()
                    .map(|judge| Choice {
                        value: judge.label().to_owned(),
                        label: judge.label().to_owned(),
                    })
                    .collect();
                (Vec::new(), choices, CanonicalAnswer::judge(answer))
            }
            QuestionKind::Single | QuestionKind::Multiple => {
                let choices = lettered_choices(&self.options)?;
                let letters = answer_letters(&self.correct_answer)?;
                for letter in &letters {
                    if !choices.iter().any(|c| c.value.starts_with(letter.as_char())) {
                        return Err(MalformedQuestionError::UnknownAnswerLetter(*letter));
                    }
                }
                if kind == QuestionKind::Single && letters.len() != 1 {
                    return Err(MalformedQuestionError::SingleAnswerExpected {
                        count: letters.len(),
                    });
                }
                (self.options, choices, CanonicalAnswer::from_letters(letters))
            }
        };

        let explanation = Some(self.explanation.trim().to_owned()).filter(|e| !e.is_empty());

        Ok(Question {
            id: QuestionId::new(self.id),
            kind,
            prompt: self.prompt,
            options,
            choices,
            correct_answer,
            max_score: self.max_score,
            explanation,
        })
    }
}

fn lettered_choices(options: &[String]) -> Result<Vec<Choice>, MalformedQuestionError> {
    if options.is_empty() {
        return Err(MalformedQuestionError::NoOptions);
    }
    let mut seen = BTreeSet::new();
    let mut choices = Vec::with_capacity(options.len());
    for (position, text) in options.iter().enumerate() {
        let letter =
            parse_option_letter(text).ok_or_else(|| MalformedQuestionError::UnlabeledOption {
                position,
                text: text.clone(),
            })?;
        if !seen.insert(letter) {
            return Err(MalformedQuestionError::DuplicateOptionLetter(letter));
        }
        choices.push(Choice {
            value: letter.as_char().to_string(),
            label: text.clone(),
        });
    }
    Ok(choices)
}

fn answer_letters(raw: &str) -> Result<BTreeSet<OptionLetter>, MalformedQuestionError> {
    raw.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, ',' | '，' | '、'))
        .map(|c| {
            OptionLetter::new(c.to_ascii_uppercase())
                .ok_or_else(|| MalformedQuestionError::InvalidAnswer(raw.to_owned()))
        })
        .collect()
}

/// Validate a whole question set; one malformed question rejects the set.
///
/// Drafts without an id (`0`) get their 1-based position.
///
/// # Errors
///
/// Returns `QuestionSetError` naming the first malformed question.
pub fn validate_question_set(
    drafts: Vec<QuestionDraft>,
) -> Result<Vec<Question>, QuestionSetError> {
    drafts
        .into_iter()
        .enumerate()
        .map(|(index, mut draft)| {
            if draft.id == 0 {
                draft.id = index as u64 + 1;
            }
            draft
                .validate()
                .map_err(|source| QuestionSetError { index, source })
        })
        .collect()
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// One selectable choice: the value it encodes to and the text shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    value: String,
    label: String,
}

impl Choice {
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A validated, immutable question.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    id: QuestionId,
    kind: QuestionKind,
    prompt: String,
    options: Vec<String>,
    choices: Vec<Choice>,
    correct_answer: CanonicalAnswer,
    max_score: f64,
    explanation: Option<String>,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Option texts as supplied; empty for judge questions.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Selectable choices in display order, including the fixed judge pair.
    #[must_use]
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    #[must_use]
    pub fn correct_answer(&self) -> &CanonicalAnswer {
        &self.correct_answer
    }

    #[must_use]
    pub fn max_score(&self) -> f64 {
        self.max_score
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    /// Whether the given choice is part of the correct answer.
    #[must_use]
    pub fn is_correct_choice(&self, id: OptionId) -> bool {
        let Some(choice) = self.choices.get(id.index()) else {
            return false;
        };
        match self.kind {
            QuestionKind::Judge => choice.value == self.correct_answer.as_str(),
            QuestionKind::Single | QuestionKind::Multiple => {
                self.correct_answer.as_str().contains(choice.value.as_str())
            }
        }
    }

    /// Back to the wire shape, with the normalized correct answer.
    #[must_use]
    pub fn to_draft(&self) -> QuestionDraft {
        let options = match self.kind {
            QuestionKind::Judge => self.choices.iter().map(|c| c.value.clone()).collect(),
            QuestionKind::Single | QuestionKind::Multiple => self.options.clone(),
        };
        QuestionDraft {
            id: self.id.value(),
            kind: self.kind.as_str().to_owned(),
            prompt: self.prompt.clone(),
            options,
            correct_answer: self.correct_answer.as_str().to_owned(),
            max_score: self.max_score,
            explanation: self.explanation.clone().unwrap_or_default(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(kind: &str, options: &[&str], answer: &str, score: f64) -> QuestionDraft {
        QuestionDraft {
            id: 1,
            kind: kind.to_owned(),
            prompt: "1. Capital of France?".to_owned(),
            options: options.iter().map(|o| (*o).to_owned()).collect(),
            correct_answer: answer.to_owned(),
            max_score: score,
            explanation: String::new(),
        }
    }

    #[test]
    fn letter_extraction_accepts_common_separators() {
        for text in ["A. Paris", "B、Lyon", "C)x", "D：y", "E", "  F text"] {
            assert!(parse_option_letter(text).is_some(), "{text}");
        }
        assert_eq!(parse_option_letter("B. Lyon").unwrap().as_char(), 'B');
    }

    #[test]
    fn letter_extraction_rejects_prose() {
        assert_eq!(parse_option_letter("Apple pie"), None);
        assert_eq!(parse_option_letter("a. lower"), None);
        assert_eq!(parse_option_letter(""), None);
        assert_eq!(parse_option_letter("1. one"), None);
    }

    #[test]
    fn single_question_validates() {
        let question = draft("single", &["A. Paris", "B. Lyon"], "A", 10.0)
            .validate()
            .unwrap();
        assert_eq!(question.kind(), QuestionKind::Single);
        assert_eq!(question.correct_answer().as_str(), "A");
        assert_eq!(question.choices()[1].value(), "B");
        assert_eq!(question.choices()[1].label(), "B. Lyon");
        assert!(question.is_correct_choice(OptionId::new(0)));
        assert!(!question.is_correct_choice(OptionId::new(1)));
        assert_eq!(question.explanation(), None);
    }

    #[test]
    fn multiple_answer_is_sorted() {
        let question = draft("multiple", &["A..", "B..", "C.."], "C, A", 5.0)
            .validate()
            .unwrap();
        assert_eq!(question.correct_answer().as_str(), "AC");
    }

    #[test]
    fn judge_answer_is_normalized() {
        let question = draft("judge", &[], "T", 5.0).validate().unwrap();
        assert_eq!(question.correct_answer().as_str(), JUDGE_TRUE_LABEL);
        assert_eq!(question.choices().len(), 2);
        assert!(question.options().is_empty());
        assert!(question.is_correct_choice(OptionId::new(0)));

        let question = draft("judge", &[], "錯誤", 5.0).validate().unwrap();
        assert_eq!(question.correct_answer().as_str(), JUDGE_FALSE_LABEL);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = draft("essay", &["A. x"], "A", 1.0).validate().unwrap_err();
        assert_eq!(err, MalformedQuestionError::UnknownKind("essay".into()));
    }

    #[test]
    fn negative_score_is_rejected() {
        let err = draft("single", &["A. x"], "A", -1.0).validate().unwrap_err();
        assert!(matches!(err, MalformedQuestionError::NegativeScore(_)));
    }

    #[test]
    fn answer_letter_must_exist() {
        let err = draft("single", &["A. x", "B. y"], "C", 1.0)
            .validate()
            .unwrap_err();
        assert!(
            matches!(err, MalformedQuestionError::UnknownAnswerLetter(l) if l.as_char() == 'C')
        );
    }

    #[test]
    fn single_rejects_multiple_letters() {
        let err = draft("single", &["A. x", "B. y"], "AB", 1.0)
            .validate()
            .unwrap_err();
        assert_eq!(err, MalformedQuestionError::SingleAnswerExpected { count: 2 });
    }

    #[test]
    fn choice_question_needs_labelled_options() {
        let err = draft("multiple", &[], "A", 1.0).validate().unwrap_err();
        assert_eq!(err, MalformedQuestionError::NoOptions);

        let err = draft("single", &["A. x", "maybe"], "A", 1.0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, MalformedQuestionError::UnlabeledOption { position: 1, .. }));

        let err = draft("single", &["A. x", "A. y"], "A", 1.0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, MalformedQuestionError::DuplicateOptionLetter(_)));
    }

    #[test]
    fn question_set_is_rejected_wholesale() {
        let good = draft("single", &["A. x"], "A", 1.0);
        let bad = draft("judge", &[], "maybe", 1.0);
        let err = validate_question_set(vec![good.clone(), bad]).unwrap_err();
        assert_eq!(err.index, 1);
        assert!(matches!(err.source, MalformedQuestionError::UnknownJudgeAnswer(_)));

        let mut unnumbered = good;
        unnumbered.id = 0;
        let set = validate_question_set(vec![unnumbered.clone(), unnumbered]).unwrap();
        assert_eq!(set[1].id(), QuestionId::new(2));
    }

    #[test]
    fn draft_reads_wire_shape() {
        let json = r#"{"id":3,"type":"judge","question":"3. Sky is blue","options":["正确","错误"],
            "answer":"正确","score":5,"explanation":"Rayleigh"}"#;
        let draft: QuestionDraft = serde_json::from_str(json).unwrap();
        let question = draft.validate().unwrap();
        assert_eq!(question.id(), QuestionId::new(3));
        assert_eq!(question.explanation(), Some("Rayleigh"));
        assert_eq!(question.to_draft().options, vec!["正确", "错误"]);
    }
}
