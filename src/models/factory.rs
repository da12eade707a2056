use std::sync::Arc;

use super::gemini::GeminiBackend;
use super::openai::OpenAiCompatibleBackend;
use super::traits::AgentBackend;
use super::types::GenerationConfig;
use crate::app::Config;
use crate::utils::MedicoreError;

/// Providers the factory knows how to build
pub const PROVIDERS: &[&str] = &["gemini", "openai"];

/// Factory for creating backend instances from configuration
pub struct BackendFactory;

impl BackendFactory {
    /// Create the backend named by `config.model.provider`
    pub fn create(config: &Config) -> Result<Arc<dyn AgentBackend>, MedicoreError> {
        let generation = GenerationConfig::from(&config.model);
        let model_name = config.model.name.as_str();

        match config.model.provider.to_ascii_lowercase().as_str() {
            "gemini" | "google" => {
                let api_key = config.gemini.api_key().ok_or_else(|| {
                    MedicoreError::Config(format!(
                        "{} is not set; export your Gemini API key or choose another provider",
                        config.gemini.api_key_env
                    ))
                })?;
                let backend =
                    GeminiBackend::new(&config.gemini.base_url, model_name, api_key, generation)?;
                Ok(Arc::new(backend))
            }
            "openai" | "litellm" => {
                let backend = OpenAiCompatibleBackend::new(
                    &config.openai.base_url,
                    model_name,
                    config.openai.api_key(),
                    generation,
                )?;
                Ok(Arc::new(backend))
            }
            other => Err(MedicoreError::Config(format!(
                "unknown provider '{}' (expected one of: {})",
                other,
                PROVIDERS.join(", ")
            ))),
        }
    }
}
