use crate::providers::provider::{LlmProvider, BaseProvider};
use crate::providers::types::{LlmRequest, LlmResponse, LlmStream, StreamChunk, TokenUsage};
use crate::providers::streaming::{parse_sse_line, AnthropicStreamEvent};
use crate::errors::{LlmError, LlmResult};
use crate::constants;

use async_trait::async_trait;
use futures::StreamExt;
use log::debug;
use reqwest::header;
use serde::{Serialize, Deserialize};

/// Provider implementation for Anthropic's Claude models
pub struct AnthropicProvider {
    base: BaseProvider,
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
    model: String,
    usage: Option<AnthropicUsage>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    text: String,
    #[serde(rename = "type")]
    content_type: String,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicProvider {
    /// Creates a new Anthropic provider
    ///
    /// # Parameters
    /// * `api_key` - Anthropic API key
    /// * `endpoint` - Optional endpoint override; defaults to the public API
    pub fn new(api_key: String, endpoint: Option<String>) -> Self {
        let endpoint = endpoint.unwrap_or_else(|| constants::ANTHROPIC_API_ENDPOINT.to_string());
        let base = BaseProvider::new("anthropic".to_string(), api_key, endpoint);
        Self { base }
    }

    fn build_headers(&self) -> LlmResult<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            "x-api-key",
            header::HeaderValue::from_str(self.base.api_key())
                .map_err(|e| LlmError::ConfigError(format!("Invalid API key format: {}", e)))?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            "anthropic-version",
            header::HeaderValue::from_static(constants::ANTHROPIC_API_VERSION),
        );
        Ok(headers)
    }

    fn build_request(&self, request: &LlmRequest, stream: bool) -> AnthropicRequest {
        let system = if request.system_prompt.is_empty() {
            None
        } else {
            Some(request.system_prompt.clone())
        };

        AnthropicRequest {
            model: request.model.clone(),
            system,
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: request.user_prompt.clone(),
            }],
            max_tokens: request.max_tokens.unwrap_or(constants::DEFAULT_MAX_TOKENS),
            temperature: request.temperature,
            stream: if stream { Some(true) } else { None },
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    /// Generates a completion using Anthropic's messages API
    async fn generate(&self, request: &LlmRequest) -> LlmResult<LlmResponse> {
        let headers = self.build_headers()?;
        let anthropic_request = self.build_request(request, false);

        let response = self.base.client()
            .post(self.base.endpoint())
            .headers(headers)
            .json(&anthropic_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::ApiError(format!("Anthropic API error: {}", error_text)));
        }

        let anthropic_response: AnthropicResponse = response.json().await?;

        if anthropic_response.content.is_empty() {
            return Err(LlmError::ApiError("No response from Anthropic".to_string()));
        }

        let usage = anthropic_response.usage.map(|u| TokenUsage {
            prompt_tokens: u.input_tokens,
            completion_tokens: u.output_tokens,
            total_tokens: u.input_tokens + u.output_tokens,
        });

        let text = anthropic_response.content.iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text.clone())
            .collect::<Vec<String>>()
            .join("");

        Ok(LlmResponse {
            content: text,
            model: anthropic_response.model,
            usage,
        })
    }

    /// Generates a streaming completion using Anthropic's SSE events
    async fn generate_stream(&self, request: &LlmRequest) -> LlmResult<LlmStream> {
        let headers = self.build_headers()?;
        let anthropic_request = self.build_request(request, true);

        let response = self.base.client()
            .post(self.base.endpoint())
            .headers(headers)
            .json(&anthropic_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::ApiError(format!("Anthropic API error: {}", error_text)));
        }

        let byte_stream = response.bytes_stream();

        let chunk_stream = byte_stream
            .map(|result| result.map_err(LlmError::RequestError))
            .flat_map(|result| {
                match result {
                    Ok(bytes) => {
                        let text = String::from_utf8_lossy(&bytes);
                        let chunks: Vec<Result<StreamChunk, LlmError>> = text
                            .lines()
                            .filter_map(|line| {
                                let data = parse_sse_line(line)?;
                                if data == "[DONE]" {
                                    return None;
                                }
                                match serde_json::from_str::<AnthropicStreamEvent>(data) {
                                    Ok(AnthropicStreamEvent::Error { error }) => {
                                        Some(Err(LlmError::ApiError(format!(
                                            "Anthropic stream error ({}): {}",
                                            error.error_type, error.message
                                        ))))
                                    }
                                    Ok(event) => event.to_stream_chunk().map(Ok),
                                    Err(e) => {
                                        debug!("Skipping unparseable Anthropic stream event: {}", e);
                                        None
                                    }
                                }
                            })
                            .collect();
                        futures::stream::iter(chunks)
                    }
                    Err(e) => futures::stream::iter(vec![Err(e)]),
                }
            });

        Ok(Box::pin(chunk_stream))
    }

    /// Returns provider name
    fn get_name(&self) -> &str {
        self.base.name()
    }
}
