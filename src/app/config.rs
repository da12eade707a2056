use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    DEFAULT_GEMINI_API_KEY_ENV, DEFAULT_GEMINI_BASE_URL, DEFAULT_HANDOFF_DELAY_MS,
    DEFAULT_MAX_IMAGE_BYTES, DEFAULT_MAX_TOKENS, DEFAULT_MODEL_NAME, DEFAULT_OPENAI_API_KEY_ENV,
    DEFAULT_OPENAI_BASE_URL, DEFAULT_PROVIDER, DEFAULT_ROUTING_DELAY_MS, DEFAULT_TEMPERATURE,
    HTTP_REQUEST_TIMEOUT_SECS,
};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Model selection and generation parameters
    #[serde(default)]
    pub model: ModelSettings,

    /// Gemini endpoint
    #[serde(default, deserialize_with = "gemini_endpoint")]
    pub gemini: EndpointConfig,

    /// OpenAI-compatible endpoint (LiteLLM proxy or similar)
    #[serde(default = "EndpointConfig::openai", deserialize_with = "openai_endpoint")]
    pub openai: EndpointConfig,

    /// Cosmetic pauses around each exchange
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Input capture limits
    #[serde(default)]
    pub input: InputConfig,

    /// UI configuration
    #[serde(default)]
    pub ui: UIConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: ModelSettings::default(),
            gemini: EndpointConfig::default(),
            openai: EndpointConfig::openai(),
            pacing: PacingConfig::default(),
            input: InputConfig::default(),
            ui: UIConfig::default(),
        }
    }
}

/// Model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Backend provider (gemini, openai)
    pub provider: String,
    /// Model name as the provider knows it
    pub name: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// Per-request timeout
    pub request_timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            name: DEFAULT_MODEL_NAME.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout_secs: HTTP_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Where a backend lives and how it authenticates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL, without a trailing path
    pub base_url: String,
    /// Environment variable containing the API key
    pub api_key_env: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            api_key_env: DEFAULT_GEMINI_API_KEY_ENV.to_string(),
        }
    }
}

impl EndpointConfig {
    fn openai() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            api_key_env: DEFAULT_OPENAI_API_KEY_ENV.to_string(),
        }
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// An endpoint section with any subset of its keys
#[derive(Deserialize)]
struct PartialEndpoint {
    base_url: Option<String>,
    api_key_env: Option<String>,
}

impl PartialEndpoint {
    fn or(self, defaults: EndpointConfig) -> EndpointConfig {
        EndpointConfig {
            base_url: self.base_url.unwrap_or(defaults.base_url),
            api_key_env: self.api_key_env.unwrap_or(defaults.api_key_env),
        }
    }
}

// The two endpoint sections share a type but not their defaults
fn gemini_endpoint<'de, D: Deserializer<'de>>(d: D) -> Result<EndpointConfig, D::Error> {
    Ok(PartialEndpoint::deserialize(d)?.or(EndpointConfig::default()))
}

fn openai_endpoint<'de, D: Deserializer<'de>>(d: D) -> Result<EndpointConfig, D::Error> {
    Ok(PartialEndpoint::deserialize(d)?.or(EndpointConfig::openai()))
}

/// Pacing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Pause before the request is sent ("routing")
    pub routing_delay_ms: u64,
    /// Pause between learning the category and showing the answer ("handoff")
    pub handoff_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            routing_delay_ms: DEFAULT_ROUTING_DELAY_MS,
            handoff_delay_ms: DEFAULT_HANDOFF_DELAY_MS,
        }
    }
}

impl PacingConfig {
    /// No pauses at all
    pub fn disabled() -> Self {
        Self {
            routing_delay_ms: 0,
            handoff_delay_ms: 0,
        }
    }

    pub fn routing_delay(&self) -> Duration {
        Duration::from_millis(self.routing_delay_ms)
    }

    pub fn handoff_delay(&self) -> Duration {
        Duration::from_millis(self.handoff_delay_ms)
    }
}

/// Input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Largest image accepted for attachment, in bytes
    pub max_image_bytes: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UIConfig {
    /// Show the agent sidebar
    pub show_sidebar: bool,
    /// Show the visualization panel
    pub show_panel: bool,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            show_sidebar: true,
            show_panel: true,
        }
    }
}

/// Load configuration from multiple sources
pub fn load_config() -> Result<Config> {
    let global_config = get_config_dir()?.join("config.toml");
    let local_config = PathBuf::from(".medicore/config.toml");
    extract_config(&[global_config, local_config])
}

/// Load configuration from a single explicit file
pub fn load_config_file(path: &Path) -> Result<Config> {
    let toml_str = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    toml::from_str(&toml_str)
        .with_context(|| format!("Failed to parse config at {}", path.display()))
}

/// Defaults, then each existing file in order, then MEDICORE_ environment variables
fn extract_config(files: &[PathBuf]) -> Result<Config> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    for file in files.iter().filter(|f| f.exists()) {
        figment = figment.merge(Toml::file(file));
    }

    // MEDICORE_MODEL__NAME=... maps to model.name
    figment = figment.merge(Env::prefixed("MEDICORE_").split("__"));

    figment.extract().context("Failed to load configuration")
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = if let Some(proj_dirs) = ProjectDirs::from("", "", "medicore") {
        proj_dirs.config_dir().to_path_buf()
    } else {
        // Fallback to home directory
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        PathBuf::from(home).join(".config").join("medicore")
    };
    std::fs::create_dir_all(&config_dir)?;
    Ok(config_dir)
}

/// Location of the interactive-mode log file
pub fn get_log_file() -> Result<PathBuf> {
    let data_dir = if let Some(proj_dirs) = ProjectDirs::from("", "", "medicore") {
        proj_dirs.data_dir().to_path_buf()
    } else {
        get_config_dir()?
    };
    Ok(data_dir.join("medicore.log"))
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(p) => p,
        None => get_config_dir()?.join("config.toml"),
    };

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Create a default configuration file if it doesn't exist, returning its path
pub fn init_config() -> Result<PathBuf> {
    let config_file = get_config_dir()?.join("config.toml");

    if !config_file.exists() {
        save_config(&Config::default(), Some(config_file.clone()))?;
    }

    Ok(config_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.model.provider, "gemini");
        assert_eq!(config.gemini.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.pacing.routing_delay(), Duration::from_millis(1500));
        assert_eq!(config.pacing.handoff_delay(), Duration::from_millis(800));
        assert!(config.ui.show_panel);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[model]\nname = \"gpt-4o-mini\"\n\n[pacing]\nrouting_delay_ms = 0\n",
        )
        .unwrap();

        let layered = extract_config(&[path.clone()]).unwrap();
        let explicit = load_config_file(&path).unwrap();
        for config in [layered, explicit] {
            assert_eq!(config.model.name, "gpt-4o-mini");
            assert_eq!(config.model.provider, DEFAULT_PROVIDER);
            assert_eq!(config.model.max_tokens, DEFAULT_MAX_TOKENS);
            assert_eq!(config.pacing.routing_delay_ms, 0);
            assert_eq!(config.pacing.handoff_delay_ms, DEFAULT_HANDOFF_DELAY_MS);
            assert_eq!(config.openai.base_url, "http://localhost:4000");
            assert_eq!(config.input.max_image_bytes, DEFAULT_MAX_IMAGE_BYTES);
        }
    }

    #[test]
    fn test_partial_endpoint_keeps_its_own_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[openai]\napi_key_env = \"LITELLM_KEY\"\n").unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.openai.api_key_env, "LITELLM_KEY");
        assert_eq!(config.openai.base_url, "http://localhost:4000");
        assert_eq!(config.gemini.base_url, DEFAULT_GEMINI_BASE_URL);
    }

    #[test]
    fn test_missing_files_are_skipped() {
        let config = extract_config(&[PathBuf::from("/nonexistent/medicore.toml")]).unwrap();
        assert_eq!(config.model.name, DEFAULT_MODEL_NAME);
    }

    #[test]
    fn test_save_then_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("medicore.toml");
        let mut config = Config::default();
        config.ui.show_sidebar = false;

        save_config(&config, Some(path.clone())).unwrap();
        let loaded = load_config_file(&path).unwrap();
        assert!(!loaded.ui.show_sidebar);
        assert_eq!(loaded.openai.api_key_env, "OPENAI_API_KEY");
    }
}
