use std::time::Duration;

use crate::app::ModelSettings;
use crate::constants::ROUTING_SYSTEM_PROMPT;

/// Generation parameters shared by every backend
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_tokens: usize,
    pub system_prompt: String,
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::from(&ModelSettings::default())
    }
}

impl From<&ModelSettings> for GenerationConfig {
    fn from(settings: &ModelSettings) -> Self {
        Self {
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            system_prompt: ROUTING_SYSTEM_PROMPT.to_string(),
            timeout: Duration::from_secs(settings.request_timeout_secs),
        }
    }
}
