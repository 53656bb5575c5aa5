//! Question validator.
//!
//! Checks each normalized record against the shape a gradable question must
//! have. Records that fail are kept aside so the caller can still show them
//! read-only, but they never reach [`crate::grading::grade`].

use serde::Serialize;
use serde_json::Value;

use crate::diagnostics::{Diagnostic, DiagnosticReporter};
use crate::error::ValidationError;
use crate::model::{CodingQuestion, Record, TestCase, ValidQuestion, OPTION_COUNT};

/// Validate a single multiple-choice record.
///
/// Checks run in order and stop at the first failure:
/// 1. `question` is a non-empty string
/// 2. `options` is a list of exactly [`OPTION_COUNT`] strings
/// 3. `correct_answer` is an integer index into `options`
pub fn validate(record: &Record) -> Result<ValidQuestion, ValidationError> {
    let question = non_empty_str(record, "question")?;

    let options = match record.get("options") {
        Some(Value::Array(items)) if items.len() == OPTION_COUNT => items
            .iter()
            .map(|o| o.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>(),
        _ => None,
    }
    .ok_or(ValidationError::MalformedOptions {
        expected: OPTION_COUNT,
    })?;

    let correct_answer = record
        .get("correct_answer")
        .and_then(Value::as_u64)
        .and_then(|i| usize::try_from(i).ok())
        .filter(|&i| i < options.len())
        .ok_or(ValidationError::InvalidAnswerIndex {
            options: options.len(),
        })?;

    let explanation = record
        .get("explanation")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string);

    Ok(ValidQuestion {
        question,
        options,
        correct_answer,
        explanation,
    })
}

/// A record excluded from the gradable set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRecord {
    /// Position in the normalized sequence.
    pub index: usize,
    #[serde(serialize_with = "serialize_error")]
    pub error: ValidationError,
    /// The record as the provider sent it.
    pub record: Record,
}

fn serialize_error<S: serde::Serializer>(
    error: &ValidationError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// The outcome of validating a whole normalized sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuestionSet {
    /// Gradable questions, in their original relative order.
    pub valid: Vec<ValidQuestion>,
    /// Excluded records, in their original relative order.
    pub rejected: Vec<RejectedRecord>,
}

/// Partition records into gradable questions and rejected records.
///
/// Each rejection, and each accepted question with repeated option texts, is
/// reported to `reporter`.
pub fn validate_all(records: Vec<Record>, reporter: &dyn DiagnosticReporter) -> QuestionSet {
    let (valid, rejected) = partition(records, reporter, |index, record| {
        let question = validate(record)?;
        if question.has_duplicate_options() {
            tracing::warn!(
                "question {} has duplicate option texts; grading accepts any match",
                index + 1
            );
            reporter.report(Diagnostic::DuplicateOptions { index });
        }
        Ok(question)
    });
    QuestionSet { valid, rejected }
}

/// Partition coding-exercise records, reporting each rejection.
pub fn validate_all_coding(
    records: Vec<Record>,
    reporter: &dyn DiagnosticReporter,
) -> (Vec<CodingQuestion>, Vec<RejectedRecord>) {
    partition(records, reporter, |_, record| validate_coding(record))
}

fn partition<T>(
    records: Vec<Record>,
    reporter: &dyn DiagnosticReporter,
    mut check: impl FnMut(usize, &Record) -> Result<T, ValidationError>,
) -> (Vec<T>, Vec<RejectedRecord>) {
    let mut valid = Vec::new();
    let mut rejected = Vec::new();

    for (index, record) in records.into_iter().enumerate() {
        match check(index, &record) {
            Ok(item) => valid.push(item),
            Err(error) => {
                tracing::warn!("excluding question {}: {error}", index + 1);
                reporter.report(Diagnostic::Rejected {
                    index,
                    error: error.clone(),
                });
                rejected.push(RejectedRecord {
                    index,
                    error,
                    record,
                });
            }
        }
    }

    (valid, rejected)
}

/// Validate a coding-exercise record.
///
/// Only `question` is required. `test_cases`, when present, must be a list of
/// objects with `input` and `output`; numbers and booleans are accepted and
/// rendered as text.
pub fn validate_coding(record: &Record) -> Result<CodingQuestion, ValidationError> {
    let question = non_empty_str(record, "question")?;

    let test_cases = match record.get("test_cases") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                Some(TestCase {
                    input: scalar_text(item.get("input")?)?,
                    output: scalar_text(item.get("output")?)?,
                })
            })
            .collect::<Option<Vec<_>>>()
            .ok_or(ValidationError::MalformedTestCases)?,
        Some(_) => return Err(ValidationError::MalformedTestCases),
    };

    Ok(CodingQuestion {
        question,
        starter_code: optional_str(record, "starter_code"),
        solution: optional_str(record, "solution"),
        test_cases,
        explanation: optional_str(record, "explanation"),
    })
}

fn non_empty_str(record: &Record, field: &'static str) -> Result<String, ValidationError> {
    record
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .ok_or(ValidationError::MissingField(field))
}

fn optional_str(record: &Record, field: &str) -> Option<String> {
    record
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
