//! Document summarizer.
//!
//! Reads the single-object summary reply (`summary`, `key_skills`,
//! `difficulty`, `estimated_time`) with the same parse-or-pass-through rules
//! as the question normalizer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SummaryError;
use crate::model::Difficulty;
use crate::normalize::{parse_json_text, shape_of, RawResponse};

/// A structured document summary.
///
/// `summary` and `estimated_time` are not defaulted when the provider omits
/// them; the accessors return [`SummaryError::KeyMissing`] so the caller can
/// surface it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub key_skills: Vec<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Minutes needed to work through the document.
    #[serde(default)]
    pub estimated_time: Option<u32>,
}

impl SummaryRecord {
    pub fn summary(&self) -> Result<&str, SummaryError> {
        self.summary
            .as_deref()
            .ok_or(SummaryError::KeyMissing("summary"))
    }

    pub fn estimated_time(&self) -> Result<u32, SummaryError> {
        self.estimated_time
            .ok_or(SummaryError::KeyMissing("estimated_time"))
    }
}

/// Read a summary reply.
pub fn normalize_summary(raw: RawResponse) -> Result<SummaryRecord, SummaryError> {
    match raw {
        RawResponse::Keyed(map) => summary_from_map(map),
        RawResponse::Text(text) => match parse_json_text(&text)? {
            Value::Object(map) => summary_from_map(map),
            other => Err(SummaryError::UnexpectedShape {
                found: shape_of(&other),
            }),
        },
        RawResponse::List(_) => Err(SummaryError::UnexpectedShape { found: "list" }),
        RawResponse::Scalar(value) => Err(SummaryError::UnexpectedShape {
            found: shape_of(&value),
        }),
    }
}

fn summary_from_map(map: Map<String, Value>) -> Result<SummaryRecord, SummaryError> {
    let summary = match map.get("summary") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err(SummaryError::MalformedField("summary")),
    };

    let key_skills = match map.get("key_skills") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .ok_or(SummaryError::MalformedField("key_skills"))?,
        Some(_) => return Err(SummaryError::MalformedField("key_skills")),
    };

    let difficulty = map
        .get("difficulty")
        .and_then(Value::as_str)
        .map(Difficulty::from_lenient)
        .unwrap_or_default();

    let estimated_time = match map.get("estimated_time") {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            minutes_from(value).ok_or(SummaryError::MalformedField("estimated_time"))?,
        ),
    };

    Ok(SummaryRecord {
        summary,
        key_skills,
        difficulty,
        estimated_time,
    })
}

/// Accepts `30`, `30.0`, `"30"` and `"30 minutes"`.
fn minutes_from(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_u64() {
                u32::try_from(i).ok()
            } else {
                n.as_f64()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u32::MAX as f64)
                    .map(|f| f as u32)
            }
        }
        Value::String(s) => {
            let digits: String = s
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().ok()
        }
        _ => None,
    }
}
