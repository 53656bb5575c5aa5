//! Core data model types for studybuddy.
//!
//! Provider replies arrive as loosely-shaped JSON [`Record`]s; the validator
//! turns them into the typed records defined here.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use std::str::FromStr;

/// A single raw record as it came out of the response normalizer.
pub type Record = serde_json::Value;

/// The number of options every multiple-choice question must carry.
pub const OPTION_COUNT: usize = 4;

/// A multiple-choice question that passed validation and can be graded.
///
/// Deserializing runs the same checks as [`crate::validate::validate`], so a
/// saved quiz cannot smuggle in an out-of-range `correct_answer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Record")]
pub struct ValidQuestion {
    /// The question text (never empty).
    pub question: String,
    /// Exactly [`OPTION_COUNT`] answer choices, in display order.
    pub options: Vec<String>,
    /// Index into `options` of the correct choice.
    pub correct_answer: usize,
    /// Why the correct answer is correct, if the provider supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl ValidQuestion {
    /// Text of the correct option, or `""` if `correct_answer` is out of range.
    pub fn correct_option(&self) -> &str {
        self.options
            .get(self.correct_answer)
            .map_or("", String::as_str)
    }

    /// Whether two or more options share the same text.
    pub fn has_duplicate_options(&self) -> bool {
        self.options
            .iter()
            .enumerate()
            .any(|(i, a)| self.options[i + 1..].contains(a))
    }
}

impl TryFrom<Record> for ValidQuestion {
    type Error = ValidationError;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        crate::validate::validate(&record)
    }
}

/// A coding exercise. Not auto-gradable; test cases are descriptive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodingQuestion {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starter_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// An example input and its expected output for a coding exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub output: String,
}

/// How hard a document or a generated question set is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Lenient conversion used for provider output: unknown values become `Medium`.
    pub fn from_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(options: [&str; 4], correct_answer: usize) -> ValidQuestion {
        ValidQuestion {
            question: "Which one?".into(),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_answer,
            explanation: None,
        }
    }

    #[test]
    fn difficulty_display_and_parse() {
        assert_eq!(Difficulty::Hard.to_string(), "Hard");
        assert_eq!("easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("MEDIUM".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert_eq!(" Hard ".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("extreme".parse::<Difficulty>().is_err());
    }

    #[test]
    fn lenient_difficulty_falls_back_to_medium() {
        assert_eq!(Difficulty::from_lenient("impossible"), Difficulty::Medium);
        assert_eq!(Difficulty::from_lenient("hArD"), Difficulty::Hard);
        assert_eq!(Difficulty::default(), Difficulty::Medium);
    }

    #[test]
    fn correct_option_text() {
        let q = question(["3", "4", "5", "6"], 1);
        assert_eq!(q.correct_option(), "4");
        assert!(!q.has_duplicate_options());
    }

    #[test]
    fn out_of_range_answer_has_no_correct_option() {
        let q = question(["3", "4", "5", "6"], 7);
        assert_eq!(q.correct_option(), "");
    }

    #[test]
    fn deserializing_validates() {
        let q: ValidQuestion = serde_json::from_str(
            r#"{"question": "2+2?", "options": ["3", "4", "5", "6"], "correct_answer": 1}"#,
        )
        .unwrap();
        assert_eq!(q.correct_option(), "4");

        let err = serde_json::from_str::<ValidQuestion>(
            r#"{"question": "2+2?", "options": ["3", "4", "5", "6"], "correct_answer": 7}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("correct_answer"));

        assert!(serde_json::from_str::<ValidQuestion>(
            r#"{"question": "2+2?", "options": ["3", "4"], "correct_answer": 1}"#,
        )
        .is_err());
    }

    #[test]
    fn detects_duplicate_options() {
        let q = question(["yes", "no", "yes", "maybe"], 0);
        assert!(q.has_duplicate_options());
    }

    #[test]
    fn coding_question_optional_fields_default() {
        let q: CodingQuestion =
            serde_json::from_str(r#"{"question": "Reverse a string"}"#).unwrap();
        assert!(q.starter_code.is_none());
        assert!(q.test_cases.is_empty());
    }
}
