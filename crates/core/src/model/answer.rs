use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::model::question::{JudgeAnswer, OptionLetter};

/// Normalized encoding of a selection, compared by exact string equality.
///
/// Multi-value answers are sorted lexicographically and concatenated without a
/// separator, so the encoding does not depend on the order choices were made.
/// The empty answer means "not answered".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalAnswer(String);

impl CanonicalAnswer {
    #[must_use]
    pub fn unanswered() -> Self {
        Self(String::new())
    }

    /// Encode a set of choice values.
    #[must_use]
    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let sorted: BTreeSet<&str> = values.into_iter().collect();
        Self(sorted.into_iter().collect())
    }

    #[must_use]
    pub fn from_letters(letters: impl IntoIterator<Item = OptionLetter>) -> Self {
        let sorted: BTreeSet<OptionLetter> = letters.into_iter().collect();
        Self(sorted.into_iter().map(OptionLetter::as_char).collect())
    }

    #[must_use]
    pub fn judge(answer: JudgeAnswer) -> Self {
        Self(answer.label().to_owned())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CanonicalAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
