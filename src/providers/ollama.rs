use crate::providers::provider::{LlmProvider, BaseProvider};
use crate::providers::types::{LlmRequest, LlmResponse, LlmStream, StreamChunk, TokenUsage};
use crate::providers::streaming::OllamaStreamChunk;
use crate::errors::{LlmError, LlmResult};
use crate::constants;

use async_trait::async_trait;
use futures::StreamExt;
use log::debug;
use reqwest::header;
use serde::{Serialize, Deserialize};
use url::Url;

/// Provider implementation for Ollama (local LLMs)
pub struct OllamaProvider {
    base: BaseProvider,
}

/// Request structure for Ollama's chat API
#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Serialize, Default)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>, // Corresponds to max_tokens
}

/// Response structure from Ollama's chat API (non-streaming)
#[derive(Deserialize)]
struct OllamaResponse {
    model: String,
    message: OllamaMessage,
    #[serde(default)]
    prompt_eval_count: u32,
    #[serde(default)]
    eval_count: u32,
}

impl OllamaProvider {
    /// Creates a new Ollama provider
    ///
    /// # Parameters
    /// * `api_key` - Usually empty for Ollama; sent as a Bearer token when set
    /// * `endpoint` - Optional base endpoint override. If None, uses the default from constants.
    pub fn new(api_key: String, endpoint: Option<String>) -> Self {
        let base_endpoint = endpoint.unwrap_or_else(|| constants::OLLAMA_API_ENDPOINT.to_string());

        // Normalize the endpoint so it always targets the chat API path
        let final_endpoint = match Url::parse(&base_endpoint) {
            Ok(mut url) => {
                if !url.path().ends_with("/api/chat") {
                    if url.path() == "/" {
                        url.set_path("api/chat");
                    } else {
                        let current_path = url.path().trim_end_matches('/');
                        url.set_path(&format!("{}/api/chat", current_path));
                    }
                }
                url.to_string()
            }
            Err(_) => {
                log::warn!(
                    "Invalid Ollama endpoint URL '{}' provided. Falling back to default: {}",
                    base_endpoint, constants::OLLAMA_API_ENDPOINT
                );
                format!("{}/api/chat", constants::OLLAMA_API_ENDPOINT)
            }
        };

        let base = BaseProvider::new("ollama".to_string(), api_key, final_endpoint);
        Self { base }
    }

    fn build_headers(&self) -> LlmResult<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        if !self.base.api_key().is_empty() {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", self.base.api_key()))
                .map_err(|e| LlmError::ConfigError(format!("Invalid API key format for Ollama: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
        }

        Ok(headers)
    }

    fn build_request(&self, request: &LlmRequest, stream: bool) -> OllamaRequest {
        let mut messages = Vec::new();
        if !request.system_prompt.is_empty() {
            messages.push(OllamaMessage {
                role: "system".to_string(),
                content: request.system_prompt.clone(),
            });
        }
        messages.push(OllamaMessage {
            role: "user".to_string(),
            content: request.user_prompt.clone(),
        });

        let options = OllamaOptions {
            temperature: request.temperature,
            num_predict: request.max_tokens,
        };

        OllamaRequest {
            model: request.model.clone(),
            messages,
            stream,
            options: Some(options)
                .filter(|o| o.temperature.is_some() || o.num_predict.is_some()),
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    /// Generates a completion using Ollama's chat API
    async fn generate(&self, request: &LlmRequest) -> LlmResult<LlmResponse> {
        let headers = self.build_headers()?;
        let ollama_request = self.build_request(request, false);

        let response = self.base.client()
            .post(self.base.endpoint())
            .headers(headers)
            .json(&ollama_request)
            .send()
            .await?;

        let response_status = response.status();
        if !response_status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| format!("Unknown error. Status: {}", response_status));
            return Err(LlmError::ApiError(format!("Ollama API error: {}", error_text)));
        }

        let response_text = response.text().await?;
        if response_text.is_empty() {
            return Err(LlmError::ApiError("Received empty response body from Ollama".to_string()));
        }

        let ollama_response: OllamaResponse = serde_json::from_str(&response_text)
            .map_err(|e| LlmError::ApiError(format!(
                "Failed to parse Ollama JSON response: {}. Body: {}", e, response_text
            )))?;

        // Ollama reports eval_count for completion tokens and
        // prompt_eval_count for prompt tokens
        let usage = Some(TokenUsage {
            prompt_tokens: ollama_response.prompt_eval_count,
            completion_tokens: ollama_response.eval_count,
            total_tokens: ollama_response.prompt_eval_count + ollama_response.eval_count,
        });

        Ok(LlmResponse {
            content: ollama_response.message.content,
            model: ollama_response.model,
            usage,
        })
    }

    /// Generates a streaming completion; Ollama streams NDJSON lines
    async fn generate_stream(&self, request: &LlmRequest) -> LlmResult<LlmStream> {
        let headers = self.build_headers()?;
        let ollama_request = self.build_request(request, true);

        let response = self.base.client()
            .post(self.base.endpoint())
            .headers(headers)
            .json(&ollama_request)
            .send()
            .await?;

        let response_status = response.status();
        if !response_status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| format!("Unknown error. Status: {}", response_status));
            return Err(LlmError::ApiError(format!("Ollama API error: {}", error_text)));
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
                                let line = line.trim();
                                if line.is_empty() {
                                    return None;
                                }
                                match serde_json::from_str::<OllamaStreamChunk>(line) {
                                    Ok(chunk) => Some(Ok(chunk.to_stream_chunk())),
                                    Err(e) => {
                                        debug!("Skipping unparseable Ollama stream line: {}", e);
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
