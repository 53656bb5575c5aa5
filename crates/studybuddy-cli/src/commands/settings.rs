//! The `studybuddy settings` command.

use std::path::{Path, PathBuf};

use anyhow::Result;

use studybuddy_providers::config::{find_config, read_config_file, CONFIG_FILE_NAME};
use studybuddy_providers::{save_config, validate_api_key, ProviderConfig, StudyConfig};

/// Changes requested on the command line. `None` leaves a value untouched.
#[derive(Debug, Default)]
pub struct SettingsUpdate {
    pub provider: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub theme: Option<String>,
    pub show_explanations: Option<bool>,
    pub reset: bool,
}

impl SettingsUpdate {
    fn is_empty(&self) -> bool {
        !self.reset
            && self.api_key.is_none()
            && self.model.is_none()
            && self.temperature.is_none()
            && self.max_tokens.is_none()
            && self.theme.is_none()
            && self.show_explanations.is_none()
    }
}

pub fn execute(update: SettingsUpdate, config_path: Option<PathBuf>) -> Result<()> {
    let path = config_path
        .or_else(find_config)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

    // The file as written; `${VAR}` references stay unexpanded.
    let mut config = if path.exists() {
        read_config_file(&path)?
    } else {
        StudyConfig::default()
    };

    if update.is_empty() {
        show(&path, &config);
        return Ok(());
    }

    if update.reset {
        config = StudyConfig::default();
    } else {
        apply(&mut config, update)?;
    }
    save_config(&config, &path)?;
    println!("Saved settings to {}", path.display());
    Ok(())
}

fn apply(config: &mut StudyConfig, update: SettingsUpdate) -> Result<()> {
    if let (Some(name), Some(key)) = (update.provider, update.api_key) {
        let mut entry = match config.providers.get(&name) {
            Some(existing) => existing.clone(),
            None => ProviderConfig::empty(&name).ok_or_else(|| {
                anyhow::anyhow!("unknown provider '{name}' (expected openai, mistral, or together)")
            })?,
        };
        if !key.contains("${") && !validate_api_key(entry.kind(), &key) {
            eprintln!("Warning: the {name} API key does not look valid; saving it anyway.");
        }
        entry.set_api_key(key);
        config.providers.insert(name, entry);
    }
    if let Some(model) = update.model {
        config.default_model = model;
    }
    if let Some(temperature) = update.temperature {
        anyhow::ensure!(
            (0.0..=1.0).contains(&temperature),
            "temperature must be between 0.0 and 1.0"
        );
        config.temperature = temperature;
    }
    if let Some(max_tokens) = update.max_tokens {
        anyhow::ensure!(max_tokens >= 1, "max tokens must be at least 1");
        config.max_tokens = max_tokens;
    }
    if let Some(theme) = update.theme {
        anyhow::ensure!(
            theme == "light" || theme == "dark",
            "theme must be 'light' or 'dark'"
        );
        config.ui.theme = theme;
    }
    if let Some(show) = update.show_explanations {
        config.ui.show_explanations = show;
    }
    Ok(())
}

fn show(path: &Path, config: &StudyConfig) {
    let source = if path.exists() {
        path.display().to_string()
    } else {
        "defaults".to_string()
    };
    println!("Settings ({source})");
    println!("  default provider:  {}", config.default_provider);
    println!("  default model:     {}", config.default_model);
    println!("  vision provider:   {}", config.vision_provider);
    println!("  vision model:      {}", config.vision_model);
    println!("  temperature:       {}", config.temperature);
    println!("  max tokens:        {}", config.max_tokens);
    println!("  theme:             {}", config.ui.theme);
    println!("  show explanations: {}", config.ui.show_explanations);

    let mut names: Vec<&String> = config.providers.keys().collect();
    names.sort();
    for name in names {
        let key = config.providers[name].api_key();
        let state = if key.is_empty() { "not set" } else { "set" };
        println!("  {name} API key: {state}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_updates_fields() {
        let mut config = StudyConfig::default();
        apply(
            &mut config,
            SettingsUpdate {
                provider: Some("mistral".into()),
                api_key: Some("abcdefghijklmnopqrstuvwxyz".into()),
                temperature: Some(0.3),
                theme: Some("dark".into()),
                show_explanations: Some(false),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(
            config.providers["mistral"].api_key(),
            "abcdefghijklmnopqrstuvwxyz"
        );
        assert_eq!(config.temperature, 0.3);
        assert_eq!(config.ui.theme, "dark");
        assert!(!config.ui.show_explanations);
        assert_eq!(config.default_model, "gpt-4o-mini");
    }

    #[test]
    fn apply_rejects_out_of_range_values() {
        let mut config = StudyConfig::default();
        let err = apply(
            &mut config,
            SettingsUpdate {
                temperature: Some(1.5),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("temperature"));

        let err = apply(
            &mut config,
            SettingsUpdate {
                provider: Some("anthropic".into()),
                api_key: Some("sk-whatever".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown provider"));
    }
}
