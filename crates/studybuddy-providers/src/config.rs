//! Settings file handling and provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use studybuddy_core::session::SessionConfig;
use studybuddy_core::traits::{ModelProvider, VisionProvider};

use crate::openai::OpenAiProvider;
use crate::together::TogetherProvider;

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "studybuddy.toml";

/// Configuration for a single provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI {
        #[serde(default)]
        api_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        org_id: Option<String>,
    },
    Mistral {
        #[serde(default)]
        api_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    Together {
        #[serde(default)]
        api_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
}

impl ProviderConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderConfig::OpenAI { .. } => "openai",
            ProviderConfig::Mistral { .. } => "mistral",
            ProviderConfig::Together { .. } => "together",
        }
    }

    pub fn api_key(&self) -> &str {
        match self {
            ProviderConfig::OpenAI { api_key, .. }
            | ProviderConfig::Mistral { api_key, .. }
            | ProviderConfig::Together { api_key, .. } => api_key,
        }
    }

    pub fn set_api_key(&mut self, key: String) {
        match self {
            ProviderConfig::OpenAI { api_key, .. }
            | ProviderConfig::Mistral { api_key, .. }
            | ProviderConfig::Together { api_key, .. } => *api_key = key,
        }
    }

    /// An empty config of the kind named `kind`, if it is a known provider.
    pub fn empty(kind: &str) -> Option<Self> {
        match kind {
            "openai" => Some(ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                org_id: None,
            }),
            "mistral" => Some(ProviderConfig::Mistral {
                api_key: String::new(),
                base_url: None,
            }),
            "together" => Some(ProviderConfig::Together {
                api_key: String::new(),
                base_url: None,
            }),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Mistral {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Mistral")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Together {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Together")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

/// Display preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_true")]
    pub show_explanations: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            show_explanations: true,
        }
    }
}

/// Top-level studybuddy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyConfig {
    /// Default provider to use for text generation.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Default model to use.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Provider used for OCR and image questions.
    #[serde(default = "default_vision_provider")]
    pub vision_provider: String,
    /// Vision model name; see [`crate::together::resolve_vision_model`].
    #[serde(default = "default_vision_model")]
    pub vision_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default)]
    pub ui: UiConfig,
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_vision_provider() -> String {
    "together".to_string()
}
fn default_vision_model() -> String {
    "free".to_string()
}
fn default_temperature() -> f64 {
    0.7
}
fn default_max_tokens() -> u32 {
    2000
}
fn default_theme() -> String {
    "light".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            default_model: default_model(),
            vision_provider: default_vision_provider(),
            vision_model: default_vision_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            providers: HashMap::new(),
            ui: UiConfig::default(),
        }
    }
}

impl StudyConfig {
    /// Generation settings for a [`studybuddy_core::session::StudySession`].
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            model: self.default_model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            show_explanations: self.ui.show_explanations,
        }
    }

    /// Look up a provider by name, falling back to an unconfigured entry for
    /// known provider kinds so a missing key surfaces at request time.
    pub fn provider(&self, name: &str) -> Result<ProviderConfig> {
        if let Some(config) = self.providers.get(name) {
            return Ok(config.clone());
        }
        ProviderConfig::empty(name)
            .with_context(|| format!("provider '{name}' not found in config"))
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    let resolve = |u: &Option<String>| u.as_deref().map(resolve_env_vars);
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: resolve(base_url),
            org_id: resolve(org_id),
        },
        ProviderConfig::Mistral { api_key, base_url } => ProviderConfig::Mistral {
            api_key: resolve_env_vars(api_key),
            base_url: resolve(base_url),
        },
        ProviderConfig::Together { api_key, base_url } => ProviderConfig::Together {
            api_key: resolve_env_vars(api_key),
            base_url: resolve(base_url),
        },
    }
}

/// Environment variables that override a provider's API key.
const KEY_OVERRIDES: [(&str, &str); 3] = [
    ("openai", "STUDYBUDDY_OPENAI_KEY"),
    ("mistral", "STUDYBUDDY_MISTRAL_KEY"),
    ("together", "STUDYBUDDY_TOGETHER_KEY"),
];

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `studybuddy.toml` in the current directory
/// 2. `~/.config/studybuddy/config.toml`
///
/// Environment variable overrides: `STUDYBUDDY_OPENAI_KEY`,
/// `STUDYBUDDY_MISTRAL_KEY`, `STUDYBUDDY_TOGETHER_KEY`.
pub fn load_config() -> Result<StudyConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<StudyConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => find_config(),
    };

    let mut config = match config_path {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            read_config_file(&path)?
        }
        None => StudyConfig::default(),
    };

    for (name, var) in KEY_OVERRIDES {
        let Ok(key) = std::env::var(var) else {
            continue;
        };
        if let Some(entry) = config.providers.get_mut(name) {
            entry.set_api_key(key);
        } else if let Some(mut entry) = ProviderConfig::empty(name) {
            entry.set_api_key(key);
            config.providers.insert(name.to_string(), entry);
        }
    }

    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();

    Ok(config)
}

/// The first existing config file in the search order, if any.
pub fn find_config() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }
    let global = global_config_path()?;
    global.exists().then_some(global)
}

/// `~/.config/studybuddy/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|h| {
        PathBuf::from(h)
            .join(".config")
            .join("studybuddy")
            .join("config.toml")
    })
}

/// Parse a config file as written, without env expansion or overrides.
pub fn read_config_file(path: &Path) -> Result<StudyConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<StudyConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

/// Write `config` to `path`, creating parent directories as needed.
pub fn save_config(config: &StudyConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, content)
        .with_context(|| format!("failed to write config: {}", path.display()))?;
    debug!(path = %path.display(), "saved config");
    Ok(())
}

/// Format check for an API key. OpenAI keys must start with `sk-`; every
/// key must be longer than 20 characters. Unknown providers never pass.
pub fn validate_api_key(provider: &str, key: &str) -> bool {
    let key = key.trim();
    match provider {
        "openai" => key.starts_with("sk-") && key.len() > 20,
        "mistral" | "together" => key.len() > 20,
        _ => false,
    }
}

/// Create a text-generation provider from its configuration.
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn ModelProvider>> {
    Ok(match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => Arc::new(OpenAiProvider::new(
            api_key,
            base_url.clone(),
            org_id.clone(),
        )?),
        ProviderConfig::Mistral { api_key, base_url } => {
            Arc::new(OpenAiProvider::mistral(api_key, base_url.clone())?)
        }
        ProviderConfig::Together { api_key, base_url } => {
            Arc::new(TogetherProvider::new(api_key, base_url.clone())?)
        }
    })
}

/// Create a vision provider from its configuration. Only Together serves
/// vision models.
pub fn create_vision_provider(config: &ProviderConfig) -> Result<Arc<dyn VisionProvider>> {
    match config {
        ProviderConfig::Together { api_key, base_url } => {
            Ok(Arc::new(TogetherProvider::new(api_key, base_url.clone())?))
        }
        other => anyhow::bail!("provider type '{}' does not support images", other.kind()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_STUDYBUDDY_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_STUDYBUDDY_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_STUDYBUDDY_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${unterminated"), "${unterminated");
        std::env::remove_var("_STUDYBUDDY_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = StudyConfig::default();
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.default_model, "gpt-4o-mini");
        assert_eq!(config.vision_model, "free");
        assert_eq!(config.max_tokens, 2000);
        assert!((config.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.ui.theme, "light");
        assert!(config.ui.show_explanations);
    }

    #[test]
    fn parse_provider_config() {
        let toml_str = r#"
default_provider = "mistral"
default_model = "mistral-small-latest"
temperature = 0.2

[providers.openai]
type = "openai"
api_key = "sk-openai"

[providers.mistral]
type = "mistral"
api_key = "mistral-key"

[providers.together]
type = "together"
api_key = "${TOGETHER_API_KEY}"

[ui]
show_explanations = false
"#;
        let config: StudyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.providers.len(), 3);
        assert_eq!(config.default_provider, "mistral");
        assert_eq!(config.max_tokens, 2000);
        assert!(!config.ui.show_explanations);
        assert_eq!(config.ui.theme, "light");
        assert!(matches!(
            config.providers.get("mistral"),
            Some(ProviderConfig::Mistral { .. })
        ));
        assert_eq!(config.session_config().temperature, 0.2);
        assert!(!config.session_config().show_explanations);
    }

    #[test]
    fn debug_masks_api_keys() {
        let config = ProviderConfig::OpenAI {
            api_key: "sk-super-secret-value-123".into(),
            base_url: None,
            org_id: None,
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("***"));
    }

    #[test]
    fn save_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = StudyConfig::default();
        config.providers.insert(
            "together".into(),
            ProviderConfig::Together {
                api_key: "${TOGETHER_API_KEY}".into(),
                base_url: None,
            },
        );
        config.ui.theme = "dark".into();
        save_config(&config, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("base_url"));

        let loaded = read_config_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn api_key_format() {
        assert!(validate_api_key("openai", "sk-abcdefghijklmnopqrstu"));
        assert!(!validate_api_key("openai", "sk-short"));
        assert!(!validate_api_key("openai", "pk-abcdefghijklmnopqrstuvwxyz"));
        assert!(validate_api_key("mistral", "abcdefghijklmnopqrstuvwxyz"));
        assert!(!validate_api_key("together", "tooshort"));
        assert!(!validate_api_key("together", "   "));
        assert!(!validate_api_key("anthropic", "abcdefghijklmnopqrstuvwxyz"));
    }

    #[test]
    fn unknown_provider_lookup() {
        let config = StudyConfig::default();
        assert!(matches!(
            config.provider("together"),
            Ok(ProviderConfig::Together { ref api_key, .. }) if api_key.is_empty()
        ));
        assert!(config.provider("anthropic").is_err());
    }

    #[test]
    fn vision_requires_together() {
        let openai = ProviderConfig::empty("openai").unwrap();
        let err = create_vision_provider(&openai).err().unwrap();
        assert!(err.to_string().contains("does not support images"));

        let together = ProviderConfig::empty("together").unwrap();
        assert_eq!(create_vision_provider(&together).unwrap().name(), "together");
        assert_eq!(create_provider(&together).unwrap().name(), "together");
    }
}
