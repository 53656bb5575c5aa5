//! The `studybuddy coding` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use studybuddy_core::model::{CodingQuestion, Difficulty};
use studybuddy_core::prompt::CodingOptions;
use studybuddy_core::CollectingReporter;

use super::{load_document, open_session, print_diagnostics};

pub async fn execute(
    document_path: PathBuf,
    questions: u32,
    difficulty: Difficulty,
    include_explanations: bool,
    format: String,
    model: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(questions >= 1, "questions must be at least 1");

    let document = load_document(&document_path)?;
    let mut session = open_session(config_path.as_deref(), model)?;
    let options = CodingOptions {
        num_questions: questions,
        difficulty,
        include_explanations,
    };

    let reporter = CollectingReporter::new();
    let set = session
        .generate_coding_questions(&document, &options, &reporter)
        .await?;
    print_diagnostics(&reporter);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&set)?);
        return Ok(());
    }

    if set.exercises.is_empty() {
        println!("No usable exercises were generated for {}.", document.name);
        return Ok(());
    }
    for (i, exercise) in set.exercises.iter().enumerate() {
        print_exercise(i, exercise, session.config().show_explanations);
    }
    Ok(())
}

fn print_exercise(index: usize, exercise: &CodingQuestion, show_explanations: bool) {
    println!("Exercise {}: {}", index + 1, exercise.question);

    if let Some(starter) = &exercise.starter_code {
        println!("\nStarter code:\n{starter}");
    }

    if !exercise.test_cases.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Input", "Expected output"]);
        for case in &exercise.test_cases {
            table.add_row(vec![Cell::new(&case.input), Cell::new(&case.output)]);
        }
        println!("\n{table}");
    }

    if let Some(solution) = &exercise.solution {
        println!("\nSolution:\n{solution}");
    }
    if show_explanations {
        if let Some(explanation) = &exercise.explanation {
            println!("\nExplanation: {explanation}");
        }
    }
    println!();
}
