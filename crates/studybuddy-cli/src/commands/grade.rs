//! The `studybuddy grade` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use studybuddy_core::grading::Answers;
use studybuddy_core::{grade, normalize, validate_all, CollectingReporter, RawResponse};

use super::{parse_answers, print_diagnostics, print_score, read_payload};

pub fn execute(
    quiz_path: PathBuf,
    answers_path: PathBuf,
    format: String,
    show_explanations: bool,
) -> Result<()> {
    let payload = read_payload(&quiz_path)?;
    let answers_text = std::fs::read_to_string(&answers_path)
        .with_context(|| format!("failed to read answers: {}", answers_path.display()))?;
    let answers = parse_answers(&answers_text)?;

    let reporter = CollectingReporter::new();
    let records = normalize(RawResponse::Text(payload), &reporter);
    let set = validate_all(records, &reporter);
    print_diagnostics(&reporter);

    for index in ignored_answers(&answers, set.valid.len()) {
        eprintln!(
            "  WARNING: answer for question {} ignored; the quiz has {} gradable question(s)",
            index + 1,
            set.valid.len()
        );
    }

    let score = grade(&set.valid, &answers);

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&score)?),
        _ => print_score(&set.valid, &score, show_explanations),
    }
    Ok(())
}

/// Answer keys with no gradable question behind them, in ascending order.
fn ignored_answers(answers: &Answers, gradable: usize) -> Vec<usize> {
    answers.range(gradable..).map(|(&index, _)| index).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_out_of_range_key_is_ignored() {
        let answers = Answers::from([
            (0, "Paris".to_string()),
            (3, "Blue".to_string()),
            (7, "Red".to_string()),
        ]);
        assert_eq!(ignored_answers(&answers, 2), vec![3, 7]);
        assert!(ignored_answers(&answers, 8).is_empty());
    }
}
