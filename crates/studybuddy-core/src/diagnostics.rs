//! Diagnostics raised while turning provider output into gradable records.
//!
//! The pipeline never fails on a bad reply; it degrades to fewer records and
//! hands a [`Diagnostic`] to whatever reporter the caller supplied.

use std::sync::Mutex;

use crate::error::{NormalizeError, ValidationError};

/// Something the presentation layer should tell the user about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The reply could not be read as a question sequence at all.
    Normalize(NormalizeError),
    /// A record at `index` of the normalized sequence was excluded.
    Rejected {
        index: usize,
        error: ValidationError,
    },
    /// A question has repeated option texts; grading by text may accept
    /// more than one choice.
    DuplicateOptions { index: usize },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::Normalize(e) => write!(f, "{e}"),
            Diagnostic::Rejected { index, error } => {
                write!(f, "question {} excluded: {error}", index + 1)
            }
            Diagnostic::DuplicateOptions { index } => {
                write!(f, "question {} has duplicate option texts", index + 1)
            }
        }
    }
}

/// Receives diagnostics from the normalizer and validator.
pub trait DiagnosticReporter: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Discards every diagnostic.
pub struct NoopReporter;

impl DiagnosticReporter for NoopReporter {
    fn report(&self, _: Diagnostic) {}
}

/// Keeps every diagnostic in arrival order.
#[derive(Default)]
pub struct CollectingReporter {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of reported parse failures.
    pub fn parse_errors(&self) -> usize {
        self.lock()
            .iter()
            .filter(|d| matches!(d, Diagnostic::Normalize(NormalizeError::Parse(_))))
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Diagnostic>> {
        // A poisoned lock still holds a usable Vec.
        self.diagnostics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DiagnosticReporter for CollectingReporter {
    fn report(&self, diagnostic: Diagnostic) {
        self.lock().push(diagnostic);
    }
}
