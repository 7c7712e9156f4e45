//! Gemini API client.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::GeminiConfig;
use crate::error::{GenerationError, GenerationResult};
use crate::prompts::analysis_from_video_prompt;
use crate::types::{GenerateTextRequest, GeminiRequest, GeminiResponse};

/// Produces the raw analysis text for a video reference.
///
/// One call, no retries. The returned text is untrusted and may wrap the
/// requested JSON envelope in conversational noise.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, basis: &str, language: &str) -> GenerationResult<String>;
}

/// Gemini generateContent client.
pub struct GeminiClient {
    config: GeminiConfig,
    http: Client,
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(config: GeminiConfig) -> GenerationResult<Self> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(GenerationError::Network)?;

        Ok(Self { config, http })
    }

    /// Create from environment variables.
    pub fn from_env() -> GenerationResult<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    /// Model used by `generate`.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Issue a single generateContent call and return the response text.
    pub async fn generate_text(&self, request: &GenerateTextRequest) -> GenerationResult<String> {
        let url = self.config.generate_content_url(&request.model);
        let body = GeminiRequest::from_text_request(request);

        debug!(
            model = %request.model,
            structured = request.structured_output,
            has_video = request.video_url.is_some(),
            "Sending generateContent request"
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::request_failed(format!("Gemini API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(model = %request.model, status, "Gemini API returned an error");
            return Err(GenerationError::Api { status, body });
        }

        let gemini_response: GeminiResponse = response.json().await?;

        match gemini_response.first_text() {
            Some(text) => {
                debug!(
                    model = %request.model,
                    chars = text.len(),
                    finish_reason = gemini_response.finish_reason().unwrap_or("unknown"),
                    "Received Gemini response"
                );
                Ok(text)
            }
            None => match gemini_response.block_reason() {
                Some(reason) => Err(GenerationError::request_failed(format!(
                    "Prompt blocked by Gemini: {}",
                    reason
                ))),
                None => Err(GenerationError::EmptyResponse),
            },
        }
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(&self, basis: &str, language: &str) -> GenerationResult<String> {
        info!(model = %self.config.model, language, "Generating video analysis");

        let request = GenerateTextRequest {
            model: self.config.model.clone(),
            prompt: analysis_from_video_prompt(language),
            video_url: Some(basis.to_string()),
            structured_output: true,
        };

        self.generate_text(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GeminiClient {
        let config = GeminiConfig::new("test-key").with_base_url(server.uri());
        GeminiClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_generate_returns_raw_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-pro:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "generationConfig": {"responseMimeType": "application/json"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "Sure! {\"analysis\":\"STYLE:\"}"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server)
            .generate("https://youtu.be/dQw4w9WgXcQ", "English")
            .await
            .unwrap();
        assert_eq!(text, r#"Sure! {"analysis":"STYLE:"}"#);

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["fileData"]["fileUri"], "https://youtu.be/dQw4w9WgXcQ");
        assert!(parts[1]["text"].as_str().unwrap().contains("written in English."));
    }

    #[tokio::test]
    async fn test_api_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate("https://youtu.be/dQw4w9WgXcQ", "English")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_empty_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": []
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate("https://youtu.be/dQw4w9WgXcQ", "English")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_blocked_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate("https://youtu.be/dQw4w9WgXcQ", "English")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }
}
