pub mod coding;
pub mod grade;
pub mod image;
pub mod init;
pub mod list_models;
pub mod quiz;
pub mod settings;
pub mod summarize;
pub mod validate;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use studybuddy_core::document::Document;
use studybuddy_core::grading::{Answers, Score};
use studybuddy_core::model::ValidQuestion;
use studybuddy_core::session::StudySession;
use studybuddy_core::CollectingReporter;
use studybuddy_providers::config::load_config_from;
use studybuddy_providers::{create_provider, ProviderError};

/// Build a session from the configured default provider.
pub fn open_session(config_path: Option<&Path>, model: Option<String>) -> Result<StudySession> {
    let config = load_config_from(config_path)?;
    let provider_config = config.provider(&config.default_provider)?;
    let provider = create_provider(&provider_config)?;

    let mut session_config = config.session_config();
    if let Some(model) = model {
        session_config.model = model;
    }
    tracing::debug!(
        "using provider '{}' with model '{}'",
        config.default_provider,
        session_config.model
    );
    Ok(StudySession::new(provider, session_config))
}

pub fn load_document(path: &Path) -> Result<Document> {
    Document::from_path(path).with_context(|| format!("could not load {}", path.display()))
}

/// Read a file, or stdin when the path is `-`.
pub fn read_payload(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        return Ok(buffer);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Parse answers given as a JSON object keyed by question index, e.g.
/// `{"0": "Paris", "2": "Blue"}`.
pub fn parse_answers(text: &str) -> Result<Answers> {
    serde_json::from_str(text)
        .context("answers must be a JSON object mapping question index to option text")
}

pub fn print_diagnostics(reporter: &CollectingReporter) {
    for diagnostic in reporter.diagnostics() {
        eprintln!("  WARNING: {diagnostic}");
    }
}

/// Print a graded quiz as a table, followed by explanations when enabled.
pub fn print_score(questions: &[ValidQuestion], score: &Score, show_explanations: bool) {
    println!(
        "Score: {}/{} ({:.1}%)",
        score.correct_count,
        score.total,
        score.fraction() * 100.0
    );
    if score.total == 0 {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Your answer", "Correct answer", "Result"]);
    for outcome in &score.per_question {
        let result = match (&outcome.selected, outcome.is_correct) {
            (None, _) => "skipped",
            (Some(_), true) => "correct",
            (Some(_), false) => "wrong",
        };
        table.add_row(vec![
            Cell::new(outcome.index + 1),
            Cell::new(outcome.selected.as_deref().unwrap_or("-")),
            Cell::new(&outcome.correct_option_text),
            Cell::new(result),
        ]);
    }
    println!("{table}");

    if score.unanswered() > 0 {
        println!("{} question(s) left unanswered.", score.unanswered());
    }

    if show_explanations {
        for (i, question) in questions.iter().enumerate() {
            if let Some(explanation) = &question.explanation {
                println!("Q{}: {explanation}", i + 1);
            }
        }
    }
}

/// A next step for errors that repeating the command will not fix.
pub fn error_hint(error: &anyhow::Error) -> Option<&'static str> {
    let permanent = error
        .chain()
        .filter_map(|cause| cause.downcast_ref::<ProviderError>())
        .any(ProviderError::is_permanent);
    permanent.then_some(
        "check the API key and model with `studybuddy settings`, or set STUDYBUDDY_<PROVIDER>_KEY",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_only_for_permanent_provider_errors() {
        let missing = anyhow::Error::new(ProviderError::MissingCredential("openai".into()))
            .context("summary request failed");
        assert!(error_hint(&missing).is_some());

        let timeout = anyhow::Error::new(ProviderError::Timeout(120));
        assert!(error_hint(&timeout).is_none());

        assert!(error_hint(&anyhow::anyhow!("could not load notes.pdf")).is_none());
    }

    #[test]
    fn answers_parse_from_index_keys() {
        let answers = parse_answers(r#"{"0": "Paris", "2": "Blue"}"#).unwrap();
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[&2], "Blue");
        assert!(parse_answers(r#"["Paris"]"#).is_err());
    }
}
