//! The `studybuddy init` command.

use std::path::Path;

use anyhow::{Context, Result};

use studybuddy_providers::config::CONFIG_FILE_NAME;

pub fn execute() -> Result<()> {
    if Path::new(CONFIG_FILE_NAME).exists() {
        println!("{CONFIG_FILE_NAME} already exists, skipping.");
    } else {
        std::fs::write(CONFIG_FILE_NAME, SAMPLE_CONFIG)
            .with_context(|| format!("failed to write {CONFIG_FILE_NAME}"))?;
        println!("Created {CONFIG_FILE_NAME}");
    }

    println!("\nNext steps:");
    println!("  1. Export OPENAI_API_KEY and TOGETHER_API_KEY, or edit {CONFIG_FILE_NAME}");
    println!("  2. Run: studybuddy summarize notes.pdf");
    println!("  3. Run: studybuddy quiz notes.pdf --questions 5");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# studybuddy configuration

default_provider = "openai"
default_model = "gpt-4o-mini"
vision_provider = "together"
vision_model = "free"
temperature = 0.7
max_tokens = 2000

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[providers.mistral]
type = "mistral"
api_key = "${MISTRAL_API_KEY}"

[providers.together]
type = "together"
api_key = "${TOGETHER_API_KEY}"

[ui]
theme = "light"
show_explanations = true
"#;
