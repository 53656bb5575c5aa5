//! The `studybuddy ocr` and `studybuddy ask-image` commands.

use std::path::PathBuf;

use anyhow::{Context, Result};

use studybuddy_core::image::ImageRef;
use studybuddy_core::prompt::{image_question_prompt, ocr_prompt};
use studybuddy_core::traits::VisionRequest;
use studybuddy_providers::config::load_config_from;
use studybuddy_providers::create_vision_provider;

pub async fn ocr(image: String, model: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let text = describe(&image, ocr_prompt(), model, config_path).await?;
    println!("{text}");
    Ok(())
}

pub async fn ask(
    image: String,
    question: String,
    model: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let prompt = image_question_prompt(&question).context("question must not be empty")?;
    let answer = describe(&image, prompt, model, config_path).await?;
    println!("{answer}");
    Ok(())
}

async fn describe(
    image: &str,
    prompt: String,
    model: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<String> {
    let config = load_config_from(config_path.as_deref())?;
    let provider = create_vision_provider(&config.provider(&config.vision_provider)?)?;
    let image = ImageRef::from_input(image)?;

    let request = VisionRequest {
        model: model.unwrap_or(config.vision_model),
        image,
        prompt,
    };
    tracing::debug!("sending {:?} to {}", request.image, provider.name());
    provider.describe(&request).await
}
