use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
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

/// Backend for any OpenAI-compatible chat completions endpoint.
/// A LiteLLM proxy in front of Gemini, OpenAI or a local model all work.
pub struct OpenAiCompatibleBackend {
    client: Client,
    base_url: String,
    model_name: String,
    api_key: Option<String>,
    config: GenerationConfig,
}

impl OpenAiCompatibleBackend {
    /// Create a new backend instance
    pub fn new(
        base_url: &str,
        model_name: &str,
        api_key: Option<String>,
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

    /// Add authentication header if a key is available
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }

    fn request_body(&self, text: &str, image: Option<&ImagePayload>) -> Value {
        let mut content = vec![json!({ "type": "text", "text": text })];
        if let Some(image) = image {
            // The chat completions format wants a URL, so the prefix goes back on
            content.push(json!({
                "type": "image_url",
                "image_url": { "url": image.to_data_uri() }
            }));
        }

        json!({
            "model": self.model_name,
            "messages": [
                { "role": "system", "content": self.config.system_prompt },
                { "role": "user", "content": content },
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "response_format": { "type": "json_object" },
            "stream": false,
        })
    }
}

#[async_trait]
impl AgentBackend for OpenAiCompatibleBackend {
    async fn dispatch(
        &self,
        text: &str,
        image: Option<&ImagePayload>,
    ) -> Result<AgentResponse, MedicoreError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        debug!("POST {} (image: {})", url, image.is_some());

        let response = self
            .authorize(self.client.post(&url))
            .json(&self.request_body(text, image))
            .send()
            .await
            .map_err(|e| {
                MedicoreError::Network(format!("failed to reach {}: {}", self.base_url, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MedicoreError::Network(format!(
                "endpoint returned {}: {}",
                status, error_text
            )));
        }

        let body: ChatCompletionResponse = response.json().await?;
        let answer = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                MedicoreError::MalformedResponse("completion had no message content".to_string())
            })?;

        parse_agent_response(&answer)
    }

    fn name(&self) -> &str {
        &self.model_name
    }

    async fn validate_connection(&self) -> Result<bool, MedicoreError> {
        // Create a client with shorter timeout for health checks
        let health_client = Client::builder()
            .timeout(Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS))
            .build()
            .map_err(|e| MedicoreError::Config(format!("HTTP client: {}", e)))?;

        let health_url = format!("{}/health", self.base_url);
        if let Ok(response) = self.authorize(health_client.get(&health_url)).send().await {
            if response.status().is_success() {
                return Ok(true);
            }
        }

        // Try alternate health check with /v1/models endpoint
        let models_url = format!("{}/v1/models", self.base_url);
        match self.authorize(health_client.get(&models_url)).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => Err(MedicoreError::Network(format!("{} unreachable: {}", self.base_url, e))),
        }
    }
}

// Response structures (OpenAI format)

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentCategory;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_dispatch_through_proxy() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gemini/gemini-2.5-flash",
                "response_format": {"type": "json_object"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": "{\"agentType\":\"RME\",\"reasoning\":\"Clinical note\",\"content\":\"Extracted.\"}"
                    }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = OpenAiCompatibleBackend::new(
            &server.uri(),
            "gemini/gemini-2.5-flash",
            Some("sk-test".to_string()),
            GenerationConfig::default(),
        )
        .unwrap();

        let response = backend.dispatch("Dr. Sutomo notes", None).await.unwrap();
        assert_eq!(response.category, AgentCategory::Rme);
        assert_eq!(response.reasoning, "Clinical note");
        assert_eq!(response.payload, None);
    }

    #[tokio::test]
    async fn test_empty_choices_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let backend = OpenAiCompatibleBackend::new(
            &server.uri(),
            "m",
            None,
            GenerationConfig::default(),
        )
        .unwrap();

        let err = backend.dispatch("hi", None).await.unwrap_err();
        assert!(matches!(err, MedicoreError::MalformedResponse(_)));
    }

    #[test]
    fn test_image_is_sent_as_data_uri() {
        let backend =
            OpenAiCompatibleBackend::new("http://proxy", "m", None, GenerationConfig::default())
                .unwrap();
        let image = ImagePayload {
            mime_type: "image/png".to_string(),
            data: "AAAA".to_string(),
        };

        let body = backend.request_body("look", Some(&image));
        assert_eq!(
            body["messages"][1]["content"][1]["image_url"]["url"],
            "data:image/png;base64,AAAA"
        );
    }

    #[tokio::test]
    async fn test_validate_connection_falls_back_to_models() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        let backend =
            OpenAiCompatibleBackend::new(&server.uri(), "m", None, GenerationConfig::default())
                .unwrap();
        assert!(backend.validate_connection().await.unwrap());
    }

    #[tokio::test]
    async fn test_validate_connection_reports_unreachable_host() {
        let uri = MockServer::start().await.uri();
        // Server is dropped, nothing listens on that port any more
        let backend =
            OpenAiCompatibleBackend::new(&uri, "m", None, GenerationConfig::default()).unwrap();
        assert!(matches!(
            backend.validate_connection().await,
            Err(MedicoreError::Network(_))
        ));
    }
}
