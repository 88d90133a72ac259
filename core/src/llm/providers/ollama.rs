//! Ollama client implementation (native `/api/chat` endpoint)

use crate::config::ResolvedLlmConfig;
use crate::error::{LlmError, Result};
use crate::llm::{
    ChatOptions, ChatRequest, ChatResponse, FinishReason, LlmClient, LlmMessage, MessageRole,
    ToolDefinition, Usage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Ollama chat client
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [LlmMessage],
    #[serde(skip_serializing_if = "is_empty_slice")]
    tools: &'a [ToolDefinition],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Default, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    model: String,
    message: LlmMessage,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

fn is_empty_slice<T>(items: &&[T]) -> bool {
    items.is_empty()
}

impl From<&ChatOptions> for OllamaOptions {
    fn from(options: &ChatOptions) -> Self {
        Self {
            temperature: options.temperature,
            top_p: options.top_p,
            top_k: options.top_k,
            num_predict: options.max_tokens,
            stop: options.stop.clone(),
        }
    }
}

impl OllamaClient {
    /// Create a new Ollama client from resolved LLM config
    pub fn new(config: &ResolvedLlmConfig) -> Result<Self> {
        let headers = super::build_header_map(&config.headers)?;
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| LlmError::InvalidRequest {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: Some(config.api_key.clone()).filter(|key| !key.is_empty()),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    fn convert_response(&self, response: OllamaChatResponse) -> ChatResponse {
        let mut message = response.message;
        message.role = MessageRole::Assistant;

        let usage = match (response.prompt_eval_count, response.eval_count) {
            (None, None) => None,
            (prompt, completion) => {
                let prompt_tokens = prompt.unwrap_or(0);
                let completion_tokens = completion.unwrap_or(0);
                Some(Usage {
                    prompt_tokens,
                    completion_tokens,
                    total_tokens: prompt_tokens + completion_tokens,
                })
            }
        };

        let finish_reason = if message.has_tool_calls() {
            Some(FinishReason::ToolCalls)
        } else {
            response.done_reason.map(|reason| match reason.as_str() {
                "stop" => FinishReason::Stop,
                "length" => FinishReason::Length,
                _ => FinishReason::Other(reason),
            })
        };

        ChatResponse {
            message,
            model: if response.model.is_empty() {
                self.model.clone()
            } else {
                response.model
            },
            usage,
            finish_reason,
        }
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let options = request
            .options
            .as_ref()
            .filter(|options| !options.is_empty())
            .map(OllamaOptions::from);

        let body = OllamaChatRequest {
            model: &request.model,
            messages: &request.messages,
            tools: &request.tools,
            stream: false,
            options,
        };

        tracing::debug!(
            "Ollama request: {} messages, {} tools",
            request.messages.len(),
            request.tools.len()
        );

        let mut builder = self.client.post(self.endpoint()).json(&body);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Ollama request failed: {}", e);
            LlmError::Network {
                message: e.to_string(),
            }
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err((LlmError::ApiError {
                status,
                message: error_text,
            })
            .into());
        }

        let ollama_response: OllamaChatResponse =
            response.json().await.map_err(|e| LlmError::InvalidResponse {
                message: format!("Failed to parse response: {}", e),
            })?;

        let converted = self.convert_response(ollama_response);
        if converted.message.has_tool_calls() {
            tracing::debug!(
                "Ollama response contains {} tool calls",
                converted.message.tool_calls().len()
            );
        }

        Ok(converted)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }
}
