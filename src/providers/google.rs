use crate::providers::provider::{LlmProvider, BaseProvider};
use crate::providers::types::{LlmRequest, LlmResponse, LlmStream, StreamChunk, TokenUsage};
use crate::providers::streaming::parse_sse_line;
use crate::errors::{LlmError, LlmResult};
use crate::constants;

use async_trait::async_trait;
use futures::StreamExt;
use log::debug;
use reqwest::header;
use serde::{Serialize, Deserialize};

/// Provider implementation for Google's Gemini models
pub struct GoogleProvider {
    base: BaseProvider,
}

/// Request structure for Google's Gemini API
#[derive(Serialize)]
struct GoogleGenerateContentRequest {
    contents: Vec<GoogleContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "systemInstruction")]
    system_instruction: Option<GoogleContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "generationConfig")]
    generation_config: Option<GoogleGenerationConfig>,
}

#[derive(Serialize, Deserialize)]
struct GoogleContent {
    role: String,
    parts: Vec<GooglePart>,
}

#[derive(Serialize, Deserialize)]
struct GooglePart {
    text: String,
}

#[derive(Serialize, Default)]
struct GoogleGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: Option<u32>,
}

/// Response structure from Google's Gemini API
#[derive(Deserialize)]
struct GoogleGenerateContentResponse {
    candidates: Vec<GoogleCandidate>,
    #[serde(rename = "usageMetadata")]
    #[serde(default)]
    usage_metadata: Option<GoogleUsageMetadata>,
}

#[derive(Deserialize)]
struct GoogleCandidate {
    content: GoogleContent,
}

#[derive(Deserialize)]
struct GoogleUsageMetadata {
    #[serde(rename = "promptTokenCount")]
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(rename = "candidatesTokenCount")]
    #[serde(default)]
    candidates_token_count: u32,
}

/// Streaming response chunk from Google's Gemini API
#[derive(Deserialize)]
struct GoogleStreamChunk {
    candidates: Option<Vec<GoogleStreamCandidate>>,
}

#[derive(Deserialize)]
struct GoogleStreamCandidate {
    content: Option<GoogleContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

impl GoogleProvider {
    /// Creates a new Google provider
    ///
    /// # Parameters
    /// * `api_key` - Google API key
    /// * `endpoint` - Optional endpoint prefix override; defaults to the public API
    pub fn new(api_key: String, endpoint: Option<String>) -> Self {
        let endpoint =
            endpoint.unwrap_or_else(|| constants::GOOGLE_API_ENDPOINT_PREFIX.to_string());
        let base = BaseProvider::new("google".to_string(), api_key, endpoint);
        Self { base }
    }

    fn build_request(&self, request: &LlmRequest) -> GoogleGenerateContentRequest {
        let system_instruction = if request.system_prompt.is_empty() {
            None
        } else {
            Some(GoogleContent {
                role: "user".to_string(),
                parts: vec![GooglePart { text: request.system_prompt.clone() }],
            })
        };

        let generation_config = GoogleGenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_tokens,
        };

        GoogleGenerateContentRequest {
            contents: vec![GoogleContent {
                role: "user".to_string(),
                parts: vec![GooglePart { text: request.user_prompt.clone() }],
            }],
            system_instruction,
            generation_config: Some(generation_config)
                .filter(|gc| gc.temperature.is_some() || gc.max_output_tokens.is_some()),
        }
    }

    async fn read_api_error(response: reqwest::Response) -> LlmError {
        let status = response.status();
        let error_json: Result<serde_json::Value, _> = response.json().await;
        let error_details = match error_json {
            Ok(json) => json.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("Unknown error structure: {}", json)),
            Err(_) => "Failed to parse error response body".to_string(),
        };
        LlmError::ApiError(format!("Google API error ({}): {}", status, error_details))
    }
}

#[async_trait]
impl LlmProvider for GoogleProvider {
    /// Generates a completion using Google's Gemini API
    async fn generate(&self, request: &LlmRequest) -> LlmResult<LlmResponse> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base.endpoint(),
            request.model,
            self.base.api_key()
        );

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let google_request = self.build_request(request);

        let response = self.base.client()
            .post(&url)
            .headers(headers)
            .json(&google_request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::read_api_error(response).await);
        }

        let google_response: GoogleGenerateContentResponse = response.json().await
            .map_err(|e| LlmError::ApiError(format!("Failed to parse Google JSON response: {}", e)))?;

        if google_response.candidates.is_empty() {
            return Err(LlmError::ApiError(
                "No candidates returned from Google. Content may have been blocked.".to_string(),
            ));
        }

        let combined_content = google_response.candidates[0].content.parts.iter()
            .map(|part| part.text.clone())
            .collect::<Vec<String>>()
            .join("");

        let usage = google_response.usage_metadata.map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.prompt_token_count + u.candidates_token_count,
        });

        Ok(LlmResponse {
            content: combined_content,
            model: request.model.clone(),
            usage,
        })
    }

    /// Generates a streaming completion via the streamGenerateContent endpoint
    async fn generate_stream(&self, request: &LlmRequest) -> LlmResult<LlmStream> {
        let url = format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse&key={}",
            self.base.endpoint(),
            request.model,
            self.base.api_key()
        );

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let google_request = self.build_request(request);

        let response = self.base.client()
            .post(&url)
            .headers(headers)
            .json(&google_request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::read_api_error(response).await);
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
                                match serde_json::from_str::<GoogleStreamChunk>(data) {
                                    Ok(chunk) => {
                                        let candidate = chunk.candidates?.into_iter().next()?;
                                        let is_final = candidate.finish_reason.is_some();
                                        let text = candidate.content
                                            .map(|c| {
                                                c.parts.iter()
                                                    .map(|p| p.text.clone())
                                                    .collect::<Vec<_>>()
                                                    .join("")
                                            })
                                            .unwrap_or_default();
                                        if text.is_empty() && !is_final {
                                            return None;
                                        }
                                        Some(Ok(StreamChunk {
                                            content: text,
                                            model: None,
                                            is_final,
                                            usage: None,
                                        }))
                                    }
                                    Err(e) => {
                                        debug!("Failed to parse Google streaming chunk: {}", e);
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
