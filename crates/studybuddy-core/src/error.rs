//! Error types for the normalization, validation, and provider layers.
//!
//! Parse and validation errors are recovered locally by the pipeline and
//! turned into diagnostics. Provider errors are defined here as well so the
//! study session and the CLI can classify them without string matching.

use thiserror::Error;

/// A provider reply that claimed to be JSON but failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid JSON at line {line}, column {column}: {message}")]
pub struct ParseError {
    /// The text exactly as the provider returned it.
    pub raw: String,
    /// 1-based line of the syntax error.
    pub line: usize,
    /// 1-based column of the syntax error.
    pub column: usize,
    /// The underlying syntax error.
    pub message: String,
}

impl ParseError {
    pub fn from_serde(raw: &str, err: &serde_json::Error) -> Self {
        Self {
            raw: raw.to_string(),
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

/// Failures while coercing a raw reply into the canonical question sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The payload was valid JSON but not a shape we can read questions from.
    #[error("unexpected payload shape: expected a list or an object, got {found}")]
    UnexpectedShape { found: &'static str },
}

/// Reasons a question record is excluded from the gradable set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing or empty field: {0}")]
    MissingField(&'static str),

    #[error("options must be a list of exactly {expected} strings")]
    MalformedOptions { expected: usize },

    #[error("correct_answer must be an integer in 0..{options}")]
    InvalidAnswerIndex { options: usize },

    #[error("test_cases must be a list of {{input, output}} objects")]
    MalformedTestCases,
}

/// Failures while reading a summary reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummaryError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("unexpected summary shape: expected an object, got {found}")]
    UnexpectedShape { found: &'static str },

    /// A field the display needs was absent from the reply.
    #[error("summary is missing required key: {0}")]
    KeyMissing(&'static str),

    #[error("summary field {0} has an unusable value")]
    MalformedField(&'static str),
}

/// Errors that can occur when interacting with a model or vision provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// No API key is configured for the provider.
    #[error("missing API key for provider '{0}'")]
    MissingCredential(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Returns `true` if repeating the request cannot succeed without user action.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ProviderError::AuthenticationFailed(_)
                | ProviderError::MissingCredential(_)
                | ProviderError::ModelNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_carries_position() {
        let raw = "{\"questions\": [}";
        let err = serde_json::from_str::<serde_json::Value>(raw).unwrap_err();
        let parse = ParseError::from_serde(raw, &err);
        assert_eq!(parse.raw, raw);
        assert_eq!(parse.line, 1);
        assert!(parse.column > 0);
        assert!(parse.to_string().contains("line 1"));
    }

    #[test]
    fn permanent_provider_errors() {
        assert!(ProviderError::MissingCredential("openai".into()).is_permanent());
        assert!(ProviderError::AuthenticationFailed("bad key".into()).is_permanent());
        assert!(!ProviderError::Timeout(120).is_permanent());
        assert!(!ProviderError::RateLimited {
            retry_after_ms: 5000
        }
        .is_permanent());
    }
}
