//! Common streaming utilities for LLM providers
//!
//! This module provides helpers for parsing Server-Sent Events (SSE) and
//! NDJSON streams from the various LLM backends, plus the wire-format
//! chunk structures each backend produces.

use crate::providers::types::{StreamChunk, TokenUsage};

/// Parse a single SSE line and extract the data field
pub fn parse_sse_line(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.starts_with("data: ") {
        Some(&line[6..])
    } else {
        None
    }
}

/// OpenAI-compatible streaming response chunk (also used by Mistral)
#[derive(serde::Deserialize, Debug)]
pub struct OpenAIStreamChunk {
    #[serde(default)]
    pub model: Option<String>,
    pub choices: Vec<OpenAIStreamChoice>,
    #[serde(default)]
    pub usage: Option<OpenAIStreamUsage>,
}

#[derive(serde::Deserialize, Debug)]
pub struct OpenAIStreamChoice {
    pub delta: OpenAIStreamDelta,
    pub finish_reason: Option<String>,
}

#[derive(serde::Deserialize, Debug)]
pub struct OpenAIStreamDelta {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(serde::Deserialize, Debug)]
pub struct OpenAIStreamUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl OpenAIStreamChunk {
    /// Convert to a StreamChunk
    pub fn to_stream_chunk(&self) -> Option<StreamChunk> {
        if self.choices.is_empty() {
            return None;
        }

        let choice = &self.choices[0];
        let content = choice.delta.content.clone().unwrap_or_default();
        let is_final = choice.finish_reason.is_some();

        let usage = self.usage.as_ref().map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Some(StreamChunk {
            content,
            model: self.model.clone(),
            is_final,
            usage,
        })
    }
}

/// Anthropic streaming event structure
#[derive(serde::Deserialize, Debug)]
#[serde(tag = "type")]
pub enum AnthropicStreamEvent {
    #[serde(rename = "message_start")]
    MessageStart { message: AnthropicStreamMessage },
    #[serde(rename = "content_block_start")]
    ContentBlockStart { index: u32, content_block: AnthropicContentBlock },
    #[serde(rename = "content_block_delta")]
    ContentBlockDelta { index: u32, delta: AnthropicDelta },
    #[serde(rename = "content_block_stop")]
    ContentBlockStop { index: u32 },
    #[serde(rename = "message_delta")]
    MessageDelta { delta: AnthropicMessageDelta, usage: Option<AnthropicStreamUsage> },
    #[serde(rename = "message_stop")]
    MessageStop,
    #[serde(rename = "ping")]
    Ping,
    #[serde(rename = "error")]
    Error { error: AnthropicStreamError },
}

#[derive(serde::Deserialize, Debug)]
pub struct AnthropicStreamMessage {
    pub id: String,
    pub model: String,
    #[serde(default)]
    pub usage: Option<AnthropicStreamUsage>,
}

#[derive(serde::Deserialize, Debug)]
pub struct AnthropicContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(serde::Deserialize, Debug)]
pub struct AnthropicDelta {
    #[serde(rename = "type")]
    pub delta_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(serde::Deserialize, Debug)]
pub struct AnthropicMessageDelta {
    pub stop_reason: Option<String>,
}

#[derive(serde::Deserialize, Debug)]
pub struct AnthropicStreamUsage {
    #[serde(default)]
    pub input_tokens: Option<u32>,
    #[serde(default)]
    pub output_tokens: Option<u32>,
}

#[derive(serde::Deserialize, Debug)]
pub struct AnthropicStreamError {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

impl AnthropicStreamEvent {
    /// Convert to a StreamChunk if this event carries anything the caller
    /// needs to see
    pub fn to_stream_chunk(&self) -> Option<StreamChunk> {
        match self {
            AnthropicStreamEvent::ContentBlockDelta { delta, .. } => {
                delta.text.as_ref().map(|text| StreamChunk::content(text.clone()))
            }
            AnthropicStreamEvent::MessageDelta { delta, usage } => {
                if delta.stop_reason.is_none() {
                    return None;
                }
                let token_usage = usage.as_ref().map(|u| TokenUsage {
                    prompt_tokens: u.input_tokens.unwrap_or(0),
                    completion_tokens: u.output_tokens.unwrap_or(0),
                    total_tokens: u.input_tokens.unwrap_or(0) + u.output_tokens.unwrap_or(0),
                });
                Some(StreamChunk {
                    content: String::new(),
                    model: None,
                    is_final: true,
                    usage: token_usage,
                })
            }
            AnthropicStreamEvent::MessageStart { message } => Some(StreamChunk {
                content: String::new(),
                model: Some(message.model.clone()),
                is_final: false,
                usage: None,
            }),
            _ => None,
        }
    }
}

/// Ollama NDJSON streaming chunk
#[derive(serde::Deserialize, Debug)]
pub struct OllamaStreamChunk {
    #[serde(default)]
    pub model: Option<String>,
    pub message: OllamaStreamMessage,
    pub done: bool,
    #[serde(default)]
    pub prompt_eval_count: u32,
    #[serde(default)]
    pub eval_count: u32,
}

#[derive(serde::Deserialize, Debug)]
pub struct OllamaStreamMessage {
    pub role: String,
    pub content: String,
}

impl OllamaStreamChunk {
    /// Convert to a StreamChunk
    pub fn to_stream_chunk(&self) -> StreamChunk {
        let usage = if self.done {
            Some(TokenUsage {
                prompt_tokens: self.prompt_eval_count,
                completion_tokens: self.eval_count,
                total_tokens: self.prompt_eval_count + self.eval_count,
            })
        } else {
            None
        };

        StreamChunk {
            content: self.message.content.clone(),
            model: self.model.clone(),
            is_final: self.done,
            usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sse_line() {
        assert_eq!(parse_sse_line("data: {\"x\":1}"), Some("{\"x\":1}"));
        assert_eq!(parse_sse_line("  data: [DONE]  "), Some("[DONE]"));
        assert_eq!(parse_sse_line("event: ping"), None);
        assert_eq!(parse_sse_line(""), None);
    }

    #[test]
    fn test_openai_chunk_conversion() {
        let data = r#"{"choices":[{"delta":{"content":"Hi"},"finish_reason":null}]}"#;
        let chunk: OpenAIStreamChunk = serde_json::from_str(data).unwrap();
        let stream_chunk = chunk.to_stream_chunk().unwrap();
        assert_eq!(stream_chunk.content, "Hi");
        assert!(!stream_chunk.is_final);
    }

    #[test]
    fn test_anthropic_delta_conversion() {
        let data = r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hello"}}"#;
        let event: AnthropicStreamEvent = serde_json::from_str(data).unwrap();
        let stream_chunk = event.to_stream_chunk().unwrap();
        assert_eq!(stream_chunk.content, "Hello");
        assert!(!stream_chunk.is_final);
    }

    #[test]
    fn test_ollama_final_chunk_carries_usage() {
        let data = r#"{"model":"llama3","message":{"role":"assistant","content":""},"done":true,"prompt_eval_count":4,"eval_count":9}"#;
        let chunk: OllamaStreamChunk = serde_json::from_str(data).unwrap();
        let stream_chunk = chunk.to_stream_chunk();
        assert!(stream_chunk.is_final);
        assert_eq!(stream_chunk.usage.unwrap().total_tokens, 13);
    }
}
