//! The `studybuddy validate` command.

use std::path::PathBuf;

use anyhow::Result;

use studybuddy_core::validate::validate_all_coding;
use studybuddy_core::{normalize, validate_all, CollectingReporter, RawResponse};

use super::read_payload;

pub fn execute(quiz_path: PathBuf, coding: bool) -> Result<()> {
    let payload = read_payload(&quiz_path)?;

    let reporter = CollectingReporter::new();
    let records = normalize(RawResponse::Text(payload), &reporter);
    let total = records.len();

    let (valid, rejected) = if coding {
        let (exercises, rejected) = validate_all_coding(records, &reporter);
        (exercises.len(), rejected.len())
    } else {
        let set = validate_all(records, &reporter);
        (set.valid.len(), set.rejected.len())
    };

    let noun = if coding { "exercise" } else { "question" };
    println!(
        "{}: {total} record(s), {valid} valid {noun}(s), {rejected} rejected",
        quiz_path.display()
    );

    let diagnostics = reporter.diagnostics();
    for d in &diagnostics {
        println!("  WARNING: {d}");
    }

    if diagnostics.is_empty() {
        println!("All {noun}s valid.");
    } else {
        println!("\n{} warning(s) found.", diagnostics.len());
    }

    Ok(())
}
