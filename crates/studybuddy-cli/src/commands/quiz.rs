//! The `studybuddy quiz` command.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use studybuddy_core::grading::Answers;
use studybuddy_core::model::{Difficulty, ValidQuestion};
use studybuddy_core::prompt::QuizOptions;
use studybuddy_core::CollectingReporter;

use super::{load_document, open_session, parse_answers, print_diagnostics, print_score};

pub struct QuizArgs {
    pub document: PathBuf,
    pub questions: u32,
    pub difficulty: Difficulty,
    pub explanations: bool,
    pub answers: Option<PathBuf>,
    pub save: Option<PathBuf>,
    pub model: Option<String>,
    pub config: Option<PathBuf>,
}

const LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

pub async fn execute(args: QuizArgs) -> Result<()> {
    anyhow::ensure!(args.questions >= 1, "questions must be at least 1");

    let document = load_document(&args.document)?;
    let mut session = open_session(args.config.as_deref(), args.model)?;
    let options = QuizOptions {
        num_questions: args.questions,
        difficulty: args.difficulty,
        include_explanations: args.explanations,
    };

    let reporter = CollectingReporter::new();
    let quiz = session
        .generate_quiz(&document, &options, &reporter)
        .await?;
    print_diagnostics(&reporter);

    if let Some(path) = &args.save {
        let json = serde_json::to_string_pretty(&quiz)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to save quiz to {}", path.display()))?;
        eprintln!("Saved quiz to {}", path.display());
    }

    if quiz.questions.is_empty() {
        println!("No usable questions were generated for {}.", document.name);
        return Ok(());
    }

    let answers = match &args.answers {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read answers: {}", path.display()))?;
            parse_answers(&text)?
        }
        None => {
            let stdin = io::stdin();
            ask(&quiz.questions, &mut stdin.lock(), &mut io::stdout())?
        }
    };

    let score = quiz.grade(&answers);
    print_score(
        &quiz.questions,
        &score,
        session.config().show_explanations,
    );
    Ok(())
}

/// Present each question and collect the chosen option texts.
///
/// Accepts a letter (A-D) or a number (1-4). A blank line skips the
/// question; end of input leaves the remaining questions unanswered.
fn ask(
    questions: &[ValidQuestion],
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<Answers> {
    let mut answers = Answers::new();

    'questions: for (index, question) in questions.iter().enumerate() {
        writeln!(output, "\nQ{}. {}", index + 1, question.question)?;
        for (letter, option) in LETTERS.iter().zip(&question.options) {
            writeln!(output, "  {letter}) {option}")?;
        }

        loop {
            write!(output, "Your answer (A-D, blank to skip): ")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                break 'questions;
            }
            let line = line.trim();
            if line.is_empty() {
                break;
            }
            match choice_index(line).and_then(|i| question.options.get(i)) {
                Some(option) => {
                    answers.insert(index, option.clone());
                    break;
                }
                None => writeln!(output, "Please enter one of A, B, C, D.")?,
            }
        }
    }

    Ok(answers)
}

fn choice_index(input: &str) -> Option<usize> {
    let mut chars = input.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    let upper = c.to_ascii_uppercase();
    LETTERS
        .iter()
        .position(|&l| l == upper)
        .or_else(|| c.to_digit(10).and_then(|d| (1..=4).contains(&d).then(|| d as usize - 1)))
}
