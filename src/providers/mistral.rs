use crate::providers::provider::{LlmProvider, BaseProvider};
use crate::providers::types::{LlmRequest, LlmResponse, LlmStream, StreamChunk, TokenUsage};
use crate::providers::streaming::{parse_sse_line, OpenAIStreamChunk};
use crate::errors::{LlmError, LlmResult};
use crate::constants;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header;
use serde::{Serialize, Deserialize};

/// Provider implementation for Mistral AI's API
pub struct MistralProvider {
    base: BaseProvider,
}

/// Request structure for Mistral AI's chat completion API
#[derive(Serialize)]
struct MistralRequest {
    model: String,
    messages: Vec<MistralMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Serialize, Deserialize)]
struct MistralMessage {
    role: String,
    content: String,
}

/// Response structure from Mistral AI's chat completion API
#[derive(Deserialize)]
struct MistralResponse {
    model: String,
    choices: Vec<MistralChoice>,
    usage: Option<MistralUsage>,
}

#[derive(Deserialize)]
struct MistralChoice {
    message: MistralMessage,
}

#[derive(Deserialize)]
struct MistralUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl MistralProvider {
    /// Creates a new Mistral provider
    ///
    /// # Parameters
    /// * `api_key` - Mistral API key
    /// * `endpoint` - Optional endpoint override; defaults to the public API
    pub fn new(api_key: String, endpoint: Option<String>) -> Self {
        let endpoint = endpoint.unwrap_or_else(|| constants::MISTRAL_API_ENDPOINT.to_string());
        let base = BaseProvider::new("mistral".to_string(), api_key, endpoint);
        Self { base }
    }

    fn build_headers(&self) -> LlmResult<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", self.base.api_key()))
                .map_err(|e| LlmError::ConfigError(format!("Invalid API key format: {}", e)))?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        Ok(headers)
    }

    fn build_messages(request: &LlmRequest) -> Vec<MistralMessage> {
        let mut messages = Vec::new();
        if !request.system_prompt.is_empty() {
            messages.push(MistralMessage {
                role: "system".to_string(),
                content: request.system_prompt.clone(),
            });
        }
        messages.push(MistralMessage {
            role: "user".to_string(),
            content: request.user_prompt.clone(),
        });
        messages
    }
}

#[async_trait]
impl LlmProvider for MistralProvider {
    /// Generates a completion using Mistral AI's API
    async fn generate(&self, request: &LlmRequest) -> LlmResult<LlmResponse> {
        let headers = self.build_headers()?;

        let mistral_request = MistralRequest {
            model: request.model.clone(),
            messages: Self::build_messages(request),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: None,
        };

        let response = self.base.client()
            .post(self.base.endpoint())
            .headers(headers)
            .json(&mistral_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::ApiError(format!("Mistral API error: {}", error_text)));
        }

        let mistral_response: MistralResponse = response.json().await?;

        if mistral_response.choices.is_empty() {
            return Err(LlmError::ApiError("No response from Mistral".to_string()));
        }

        let usage = mistral_response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(LlmResponse {
            content: mistral_response.choices[0].message.content.clone(),
            model: mistral_response.model,
            usage,
        })
    }

    /// Generates a streaming completion; Mistral uses OpenAI-compatible SSE
    async fn generate_stream(&self, request: &LlmRequest) -> LlmResult<LlmStream> {
        let headers = self.build_headers()?;

        let mistral_request = MistralRequest {
            model: request.model.clone(),
            messages: Self::build_messages(request),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: Some(true),
        };

        let response = self.base.client()
            .post(self.base.endpoint())
            .headers(headers)
            .json(&mistral_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::ApiError(format!("Mistral API error: {}", error_text)));
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
                                match serde_json::from_str::<OpenAIStreamChunk>(data) {
                                    Ok(chunk) => chunk.to_stream_chunk().map(Ok),
                                    Err(e) => Some(Err(LlmError::ParseError(
                                        format!("Failed to parse streaming chunk: {}", e)
                                    ))),
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
