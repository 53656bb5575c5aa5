//! studybuddy-core: response normalization, question validation, and grading.
//!
//! This crate turns heterogeneous model-provider replies into validated
//! question sets and summaries, scores a user's answers, and defines the
//! provider traits the rest of studybuddy builds on.

pub mod cache;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod grading;
pub mod image;
pub mod model;
pub mod normalize;
pub mod prompt;
pub mod session;
pub mod summary;
pub mod traits;
pub mod validate;

pub use diagnostics::{CollectingReporter, Diagnostic, DiagnosticReporter, NoopReporter};
pub use error::{NormalizeError, ParseError, ProviderError, SummaryError, ValidationError};
pub use grading::{grade, Answers, Score};
pub use normalize::{normalize, RawResponse};
pub use summary::{normalize_summary, SummaryRecord};
pub use validate::{validate, validate_all};
