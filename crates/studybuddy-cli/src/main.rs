//! studybuddy CLI: study material in, summaries and quizzes out.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use studybuddy_core::model::Difficulty;

mod commands;

#[derive(Parser)]
#[command(
    name = "studybuddy",
    version,
    about = "Turn study material into summaries, quizzes, and coding exercises"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a document
    Summarize {
        /// Document to summarize (.pdf or text)
        document: PathBuf,

        /// Model override
        #[arg(long)]
        model: Option<String>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Generate a multiple-choice quiz and take it
    Quiz {
        /// Document to quiz on (.pdf or text)
        document: PathBuf,

        /// Number of questions to request
        #[arg(long, default_value = "10")]
        questions: u32,

        /// Difficulty: easy, medium, hard
        #[arg(long, default_value = "medium")]
        difficulty: Difficulty,

        /// Ask for an explanation with each question
        #[arg(long)]
        explanations: bool,

        /// Answers as a JSON object keyed by question index; skips the prompt
        #[arg(long)]
        answers: Option<PathBuf>,

        /// Save the generated quiz as JSON
        #[arg(long)]
        save: Option<PathBuf>,

        /// Model override
        #[arg(long)]
        model: Option<String>,
    },

    /// Generate coding exercises
    Coding {
        /// Document to build exercises from (.pdf or text)
        document: PathBuf,

        /// Number of exercises to request
        #[arg(long, default_value = "5")]
        questions: u32,

        /// Difficulty: easy, medium, hard
        #[arg(long, default_value = "medium")]
        difficulty: Difficulty,

        /// Do not ask for explanations
        #[arg(long)]
        no_explanations: bool,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Model override
        #[arg(long)]
        model: Option<String>,
    },

    /// Grade answers against a quiz payload or a saved quiz
    Grade {
        /// Raw provider reply or saved quiz JSON ("-" reads stdin)
        #[arg(long)]
        quiz: PathBuf,

        /// Answers as a JSON object keyed by question index
        #[arg(long)]
        answers: PathBuf,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Hide explanations in text output
        #[arg(long)]
        no_explanations: bool,
    },

    /// Check a quiz payload and report every diagnostic
    Validate {
        /// Raw provider reply ("-" reads stdin)
        #[arg(long)]
        quiz: PathBuf,

        /// Treat the payload as coding exercises
        #[arg(long)]
        coding: bool,
    },

    /// Extract text from an image
    Ocr {
        /// Image path or http(s) URL
        image: String,

        /// Vision model override (e.g. "free", "Llama-3.2-90B-Vision")
        #[arg(long)]
        model: Option<String>,
    },

    /// Ask a question about an image
    AskImage {
        /// Image path or http(s) URL
        image: String,

        /// Question to ask
        question: String,

        /// Vision model override
        #[arg(long)]
        model: Option<String>,
    },

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,
    },

    /// Show or change settings
    Settings {
        /// Provider whose API key to set (openai, mistral, together)
        #[arg(long, requires = "api_key")]
        provider: Option<String>,

        /// API key for --provider
        #[arg(long, requires = "provider")]
        api_key: Option<String>,

        /// Default model
        #[arg(long)]
        model: Option<String>,

        /// Default sampling temperature
        #[arg(long)]
        temperature: Option<f64>,

        /// Max tokens per reply
        #[arg(long)]
        max_tokens: Option<u32>,

        /// UI theme
        #[arg(long)]
        theme: Option<String>,

        /// Show explanations after grading
        #[arg(long)]
        show_explanations: Option<bool>,

        /// Restore default settings, clearing stored API keys
        #[arg(long, conflicts_with_all = ["provider", "api_key", "model", "temperature", "max_tokens", "theme", "show_explanations"])]
        reset: bool,
    },

    /// Create a starter config
    Init,
}

#[tokio::main]
async fn main() {
    let directive = match "studybuddy=info".parse() {
        Ok(directive) => directive,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Summarize {
            document,
            model,
            format,
        } => commands::summarize::execute(document, model, format, config).await,
        Commands::Quiz {
            document,
            questions,
            difficulty,
            explanations,
            answers,
            save,
            model,
        } => {
            commands::quiz::execute(commands::quiz::QuizArgs {
                document,
                questions,
                difficulty,
                explanations,
                answers,
                save,
                model,
                config,
            })
            .await
        }
        Commands::Coding {
            document,
            questions,
            difficulty,
            no_explanations,
            format,
            model,
        } => {
            commands::coding::execute(
                document,
                questions,
                difficulty,
                !no_explanations,
                format,
                model,
                config,
            )
            .await
        }
        Commands::Grade {
            quiz,
            answers,
            format,
            no_explanations,
        } => commands::grade::execute(quiz, answers, format, !no_explanations),
        Commands::Validate { quiz, coding } => commands::validate::execute(quiz, coding),
        Commands::Ocr { image, model } => commands::image::ocr(image, model, config).await,
        Commands::AskImage {
            image,
            question,
            model,
        } => commands::image::ask(image, question, model, config).await,
        Commands::ListModels { provider } => commands::list_models::execute(provider, config),
        Commands::Settings {
            provider,
            api_key,
            model,
            temperature,
            max_tokens,
            theme,
            show_explanations,
            reset,
        } => commands::settings::execute(
            commands::settings::SettingsUpdate {
                provider,
                api_key,
                model,
                temperature,
                max_tokens,
                theme,
                show_explanations,
                reset,
            },
            config,
        ),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        if let Some(hint) = commands::error_hint(&e) {
            eprintln!("Hint: {hint}");
        }
        process::exit(1);
    }
}
