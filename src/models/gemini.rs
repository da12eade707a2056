use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::traits::AgentBackend;
use super::types::GenerationConfig;
use crate::agents::{parse_agent_response, AgentResponse};
use crate::constants::HEALTH_CHECK_TIMEOUT_SECS;
use crate::input::ImagePayload;
use crate::utils::MedicoreError;

/// Google Generative Language `generateContent` backend
pub struct GeminiBackend {
    client: Client,
    base_url: String,
    model_name: String,
    api_key: String,
    config: GenerationConfig,
}

impl GeminiBackend {
    /// Create a new Gemini backend
    pub fn new(
        base_url: &str,
        model_name: &str,
        api_key: String,
        config: GenerationConfig,
    ) -> Result<Self, MedicoreError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MedicoreError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model_name: model_name.to_string(),
            api_key,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model_name
        )
    }

    /// Build the request body: system instruction, one user turn, JSON output
    fn request_body(&self, text: &str, image: Option<&ImagePayload>) -> Value {
        let mut parts = Vec::new();
        if !text.trim().is_empty() {
            parts.push(json!({ "text": text }));
        }
        if let Some(image) = image {
            parts.push(json!({
                "inlineData": {
                    "mimeType": image.mime_type,
                    "data": image.data,
                }
            }));
        }

        json!({
            "systemInstruction": {
                "parts": [{ "text": self.config.system_prompt }]
            },
            "contents": [{
                "role": "user",
                "parts": parts,
            }],
            "generationConfig": {
                "temperature": self.config.temperature,
                "maxOutputTokens": self.config.max_tokens,
                "responseMimeType": "application/json",
            }
        })
    }
}

#[async_trait]
impl AgentBackend for GeminiBackend {
    async fn dispatch(
        &self,
        text: &str,
        image: Option<&ImagePayload>,
    ) -> Result<AgentResponse, MedicoreError> {
        let url = self.endpoint();
        debug!("POST {} (image: {})", url, image.is_some());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(text, image))
            .send()
            .await
            .map_err(|e| MedicoreError::Network(format!("failed to reach {}: {}", self.base_url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MedicoreError::Network(format!(
                "Gemini returned {}: {}",
                status, error_text
            )));
        }

        let body: GenerateContentResponse = response.json().await?;
        let answer = body.answer_text()?;
        parse_agent_response(&answer)
    }

    fn name(&self) -> &str {
        &self.model_name
    }

    async fn validate_connection(&self) -> Result<bool, MedicoreError> {
        let url = format!("{}/v1beta/models/{}", self.base_url, self.model_name);
        let client = Client::builder()
            .timeout(Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS))
            .build()
            .map_err(|e| MedicoreError::Config(format!("HTTP client: {}", e)))?;

        match client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => Err(MedicoreError::Network(format!("{} unreachable: {}", self.base_url, e))),
        }
    }
}

// Response structures for generateContent

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Concatenate the text parts of the first candidate
    fn answer_text(&self) -> Result<String, MedicoreError> {
        let Some(candidate) = self.candidates.first() else {
            let reason = self
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref())
                .unwrap_or("no candidates returned");
            return Err(MedicoreError::MalformedResponse(format!(
                "Gemini gave no answer: {}",
                reason
            )));
        };

        let text: String = candidate
            .content
            .as_ref()
            .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(MedicoreError::MalformedResponse(format!(
                "Gemini answer had no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}
