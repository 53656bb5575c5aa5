//! Response normalizer.
//!
//! Coerces whatever a model provider returned (JSON text, a bare list, or an
//! object keyed by `questions`) into one canonical ordered sequence of
//! [`Record`]s. Failures are reported, never raised.

use serde_json::{Map, Value};

use crate::diagnostics::{Diagnostic, DiagnosticReporter};
use crate::error::{NormalizeError, ParseError};
use crate::model::Record;

/// Key under which providers nest the question list.
pub const QUESTIONS_KEY: &str = "questions";

/// The shapes a provider reply can take.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    /// Text expected to contain a JSON document.
    Text(String),
    /// An already-parsed list in canonical shape.
    List(Vec<Value>),
    /// An already-parsed object expected to hold a `questions` list.
    Keyed(Map<String, Value>),
    /// Anything else (number, bool, null).
    Scalar(Value),
}

impl From<Value> for RawResponse {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => RawResponse::Text(s),
            Value::Array(items) => RawResponse::List(items),
            Value::Object(map) => RawResponse::Keyed(map),
            other => RawResponse::Scalar(other),
        }
    }
}

impl From<String> for RawResponse {
    fn from(text: String) -> Self {
        RawResponse::Text(text)
    }
}

impl From<&str> for RawResponse {
    fn from(text: &str) -> Self {
        RawResponse::Text(text.to_string())
    }
}

/// Short name of a JSON value's type, for diagnostics.
pub(crate) fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Normalize a reply into the canonical question sequence.
///
/// Never fails: a parse error or an unusable shape is handed to `reporter`
/// (exactly once) and an empty sequence is returned. An object without a
/// `questions` key is a legitimate empty result and reports nothing.
pub fn normalize(raw: RawResponse, reporter: &dyn DiagnosticReporter) -> Vec<Record> {
    match try_normalize(raw) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!("could not normalize provider reply: {e}");
            reporter.report(Diagnostic::Normalize(e));
            Vec::new()
        }
    }
}

/// Fallible form of [`normalize`].
pub fn try_normalize(raw: RawResponse) -> Result<Vec<Record>, NormalizeError> {
    match raw {
        RawResponse::List(items) => Ok(items),
        RawResponse::Keyed(mut map) => match map.remove(QUESTIONS_KEY) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(NormalizeError::UnexpectedShape {
                found: shape_of(&other),
            }),
        },
        RawResponse::Text(text) => match parse_json_text(&text)? {
            Value::Array(items) => Ok(items),
            Value::Object(map) => try_normalize(RawResponse::Keyed(map)),
            other => Err(NormalizeError::UnexpectedShape {
                found: shape_of(&other),
            }),
        },
        RawResponse::Scalar(value) => Err(NormalizeError::UnexpectedShape {
            found: shape_of(&value),
        }),
    }
}

/// Parse provider text as JSON, tolerating a surrounding markdown fence.
pub fn parse_json_text(text: &str) -> Result<Value, ParseError> {
    let body = extract_json_from_markdown(text);
    serde_json::from_str(&body).map_err(|e| ParseError::from_serde(text, &e))
}

/// Extract a JSON document from a markdown-formatted reply.
///
/// Handles:
/// - A ```json``` block (first one wins)
/// - A generic ``` block (if no json-tagged block is found)
/// - Bare text with no fences (returned trimmed)
pub fn extract_json_from_markdown(response: &str) -> String {
    let mut generic_block: Option<String> = None;
    let mut in_block = false;
    let mut is_json_block = false;
    let mut is_generic_block = false;
    let mut current_block = String::new();

    for line in response.lines() {
        let trimmed = line.trim();

        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            let lang = trimmed.trim_start_matches('`').trim().to_lowercase();
            is_json_block = lang == "json";
            is_generic_block = lang.is_empty();
            current_block.clear();
            continue;
        }

        if in_block && trimmed == "```" {
            in_block = false;
            if is_json_block {
                return current_block;
            }
            if is_generic_block && generic_block.is_none() {
                generic_block = Some(current_block.clone());
            }
            current_block.clear();
            continue;
        }

        if in_block {
            if !current_block.is_empty() {
                current_block.push('\n');
            }
            current_block.push_str(line);
        }
    }

    // Truncated reply: an unclosed block still counts
    if in_block && !current_block.is_empty() {
        if is_json_block {
            return current_block;
        }
        if is_generic_block && generic_block.is_none() {
            generic_block = Some(current_block);
        }
    }

    generic_block.unwrap_or_else(|| response.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingReporter;
    use serde_json::json;

    fn sample_questions() -> Value {
        json!([
            {"question": "2+2?", "options": ["3", "4", "5", "6"], "correct_answer": 1},
            {"question": "Capital of France?", "options": ["Paris", "Rome", "Oslo", "Bern"], "correct_answer": 0}
        ])
    }

    #[test]
    fn list_passes_through_unchanged() {
        let reporter = CollectingReporter::new();
        let Value::Array(items) = sample_questions() else {
            unreachable!()
        };
        let records = normalize(RawResponse::List(items.clone()), &reporter);
        assert_eq!(records, items);
        assert!(reporter.is_empty());
    }

    #[test]
    fn text_and_parsed_object_agree() {
        let payload = json!({ "questions": sample_questions() });
        let reporter = CollectingReporter::new();

        let from_text = normalize(RawResponse::Text(payload.to_string()), &reporter);
        let from_object = normalize(RawResponse::from(payload), &reporter);

        assert_eq!(from_text, from_object);
        assert_eq!(from_text.len(), 2);
        assert!(reporter.is_empty());
    }

    #[test]
    fn text_holding_a_bare_list() {
        let reporter = CollectingReporter::new();
        let records = normalize(sample_questions().to_string().into(), &reporter);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn malformed_text_reports_one_parse_error() {
        let reporter = CollectingReporter::new();
        let records = normalize(RawResponse::from("not json"), &reporter);
        assert!(records.is_empty());
        assert_eq!(reporter.len(), 1);
        assert_eq!(reporter.parse_errors(), 1);

        let Diagnostic::Normalize(NormalizeError::Parse(e)) = &reporter.diagnostics()[0] else {
            panic!("expected a parse error");
        };
        assert_eq!(e.raw, "not json");
        assert_eq!(e.line, 1);
    }

    #[test]
    fn truncated_json_reports_parse_error() {
        let reporter = CollectingReporter::new();
        let records = normalize(
            RawResponse::from(r#"{"questions": [{"question": "2+2?""#),
            &reporter,
        );
        assert!(records.is_empty());
        assert_eq!(reporter.parse_errors(), 1);
    }

    #[test]
    fn object_without_questions_is_empty_not_error() {
        let reporter = CollectingReporter::new();
        let records = normalize(RawResponse::from(json!({"answer": 42})), &reporter);
        assert!(records.is_empty());
        assert!(reporter.is_empty());
    }

    #[test]
    fn questions_of_wrong_type_is_shape_error() {
        let reporter = CollectingReporter::new();
        let records = normalize(
            RawResponse::from(json!({"questions": "none today"})),
            &reporter,
        );
        assert!(records.is_empty());
        assert_eq!(
            reporter.diagnostics(),
            vec![Diagnostic::Normalize(NormalizeError::UnexpectedShape {
                found: "string"
            })]
        );
    }

    #[test]
    fn scalar_input_is_shape_error() {
        let reporter = CollectingReporter::new();
        assert!(normalize(RawResponse::from(json!(17)), &reporter).is_empty());
        assert!(normalize(RawResponse::from("42"), &reporter).is_empty());
        assert_eq!(reporter.len(), 2);
        assert_eq!(reporter.parse_errors(), 0);
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let payload = json!({ "questions": sample_questions() });
        let fenced = format!("Here you go:\n\n```json\n{payload}\n```\nGood luck!");
        let reporter = CollectingReporter::new();
        let records = normalize(RawResponse::Text(fenced), &reporter);
        assert_eq!(records.len(), 2);
        assert!(reporter.is_empty());
    }

    #[test]
    fn extract_generic_block_fallback() {
        let input = "```\n[1, 2]\n```";
        assert_eq!(extract_json_from_markdown(input), "[1, 2]");
    }

    #[test]
    fn extract_prefers_json_over_generic() {
        let input = "```\n[1]\n```\n\n```json\n[2]\n```\n";
        assert_eq!(extract_json_from_markdown(input), "[2]");
    }

    #[test]
    fn extract_truncated_unclosed_block() {
        let input = "```json\n{\"questions\": []}";
        assert_eq!(extract_json_from_markdown(input), "{\"questions\": []}");
    }

    #[test]
    fn extract_without_fences_returns_trimmed() {
        assert_eq!(extract_json_from_markdown("  {\"a\": 1}\n"), "{\"a\": 1}");
    }
}
