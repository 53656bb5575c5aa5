//! studybuddy-providers: model and vision provider integrations.
//!
//! Implements the `ModelProvider` trait for OpenAI and Mistral, and both
//! `ModelProvider` and `VisionProvider` for Together, plus the settings file
//! that selects between them.

pub mod config;
mod http;
pub mod mock;
pub mod openai;
pub mod together;

pub use config::{
    create_provider, create_vision_provider, load_config, save_config, validate_api_key,
    ProviderConfig, StudyConfig,
};
pub use studybuddy_core::error::ProviderError;
pub use together::resolve_vision_model;
