//! The `studybuddy summarize` command.

use std::path::PathBuf;

use anyhow::Result;

use studybuddy_core::summary::SummaryRecord;

use super::{load_document, open_session};

pub async fn execute(
    document_path: PathBuf,
    model: Option<String>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let document = load_document(&document_path)?;
    let mut session = open_session(config_path.as_deref(), model)?;

    let summary = session.summarize(&document).await?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        _ => print_summary(&document.name, &summary),
    }
    Ok(())
}

fn print_summary(name: &str, summary: &SummaryRecord) {
    println!("Summary of {name}\n");
    match summary.summary() {
        Ok(text) => println!("{text}\n"),
        Err(_) => println!("(the model did not return a summary)\n"),
    }
    println!("Difficulty: {}", summary.difficulty);
    match summary.estimated_time() {
        Ok(minutes) => println!("Estimated time: {minutes} min"),
        Err(_) => println!("Estimated time: unknown"),
    }
    if !summary.key_skills.is_empty() {
        println!("Key skills: {}", summary.key_skills.join(", "));
    }
}
