//! OpenAI-compatible client implementation using async-openai library

use crate::config::ResolvedLlmConfig;
use crate::error::{LlmError, Result};
use crate::llm::{
    ChatRequest, ChatResponse, FinishReason, LlmClient, LlmMessage, MessageRole, ToolCallRequest,
    ToolDefinition, Usage,
};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessage,
        ChatCompletionRequestAssistantMessageContent, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestToolMessage,
        ChatCompletionRequestToolMessageContent, ChatCompletionRequestUserMessage,
        ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs,
        FunctionObject,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;

/// OpenAI-compatible client using async-openai library
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiClient {
    /// Create a new OpenAI client from resolved LLM config
    pub fn new(config: &ResolvedLlmConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(LlmError::Authentication {
                message: "No API key found for OpenAI-compatible endpoint".to_string(),
            }
            .into());
        }

        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(config.base_url.trim_end_matches('/'));

        let mut client = Client::with_config(openai_config);

        if !config.headers.is_empty() {
            let headers = super::build_header_map(&config.headers)?;
            let http_client = reqwest::Client::builder()
                .default_headers(headers)
                .build()
                .map_err(|e| LlmError::InvalidRequest {
                    message: format!("Failed to build HTTP client: {}", e),
                })?;
            client = client.with_http_client(http_client);
        }

        Ok(Self {
            client,
            model: config.model.clone(),
        })
    }

    /// Convert our history to async-openai format
    ///
    /// Chat completions require every sent tool call to be answered by a tool
    /// message and every tool message to answer a sent call. Calls that were
    /// never answered are dropped from assistant messages, and tool results
    /// without a matching call are sent as user text instead.
    fn convert_messages(&self, messages: Vec<LlmMessage>) -> Vec<ChatCompletionRequestMessage> {
        let answered: HashSet<String> = messages
            .iter()
            .filter(|m| m.role == MessageRole::Tool)
            .filter_map(|m| m.tool_call_id.clone())
            .collect();
        let mut sent: HashSet<String> = HashSet::new();
        let mut converted = Vec::with_capacity(messages.len());

        for message in messages {
            match message.role {
                MessageRole::System => {
                    converted.push(ChatCompletionRequestMessage::System(
                        ChatCompletionRequestSystemMessage {
                            content: message.content.into(),
                            name: None,
                        },
                    ));
                }
                MessageRole::User => {
                    converted.push(ChatCompletionRequestMessage::User(
                        ChatCompletionRequestUserMessage {
                            content: message.content.into(),
                            name: None,
                        },
                    ));
                }
                MessageRole::Assistant => {
                    let tool_calls: Vec<ChatCompletionMessageToolCall> = message
                        .tool_calls()
                        .iter()
                        .filter_map(|call| {
                            let id = call.id.as_ref().filter(|id| answered.contains(*id))?;
                            sent.insert(id.clone());
                            Some(ChatCompletionMessageToolCall {
                                id: id.clone(),
                                r#type: ChatCompletionToolType::Function,
                                function: async_openai::types::FunctionCall {
                                    name: call.function.name.clone(),
                                    arguments: arguments_to_string(&call.function.arguments),
                                },
                            })
                        })
                        .collect();

                    let content = if message.content.is_empty() && !tool_calls.is_empty() {
                        None
                    } else {
                        Some(ChatCompletionRequestAssistantMessageContent::Text(
                            message.content,
                        ))
                    };

                    converted.push(ChatCompletionRequestMessage::Assistant(
                        ChatCompletionRequestAssistantMessage {
                            content,
                            name: None,
                            tool_calls: if tool_calls.is_empty() {
                                None
                            } else {
                                Some(tool_calls)
                            },
                            audio: None,
                            refusal: None,
                            ..Default::default()
                        },
                    ));
                }
                MessageRole::Tool => {
                    match message.tool_call_id.filter(|id| sent.contains(id)) {
                        Some(tool_call_id) => {
                            converted.push(ChatCompletionRequestMessage::Tool(
                                ChatCompletionRequestToolMessage {
                                    content: ChatCompletionRequestToolMessageContent::Text(
                                        message.content,
                                    ),
                                    tool_call_id,
                                },
                            ));
                        }
                        None => {
                            let name = message.tool_name.as_deref().unwrap_or("unknown");
                            converted.push(ChatCompletionRequestMessage::User(
                                ChatCompletionRequestUserMessage {
                                    content: format!("Tool {} returned: {}", name, message.content)
                                        .into(),
                                    name: None,
                                },
                            ));
                        }
                    }
                }
            }
        }

        converted
    }

    /// Convert our tool definitions to async-openai format
    fn convert_tools(&self, tools: Vec<ToolDefinition>) -> Vec<ChatCompletionTool> {
        tools
            .into_iter()
            .map(|tool| ChatCompletionTool {
                r#type: ChatCompletionToolType::Function,
                function: FunctionObject {
                    name: tool.function.name,
                    description: Some(tool.function.description),
                    parameters: Some(tool.function.parameters),
                    strict: None,
                },
            })
            .collect()
    }

    /// Convert async-openai response to our internal format
    fn convert_response(
        &self,
        response: async_openai::types::CreateChatCompletionResponse,
    ) -> Result<ChatResponse> {
        let choice =
            response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| LlmError::InvalidResponse {
                    message: "No choices in response".to_string(),
                })?;

        let tool_calls: Vec<ToolCallRequest> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tool_call| {
                let function = tool_call.function;
                let args: Value = serde_json::from_str(&function.arguments)
                    .unwrap_or(Value::String(function.arguments));
                ToolCallRequest::new(function.name, args).with_id(tool_call.id)
            })
            .collect();

        let content = choice.message.content.unwrap_or_default();
        let message = if tool_calls.is_empty() {
            LlmMessage::assistant(content)
        } else {
            LlmMessage::assistant_with_tool_calls(content, tool_calls)
        };

        let usage = response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        let finish_reason = choice.finish_reason.map(|reason| match reason {
            async_openai::types::FinishReason::Stop => FinishReason::Stop,
            async_openai::types::FinishReason::Length => FinishReason::Length,
            async_openai::types::FinishReason::ToolCalls => FinishReason::ToolCalls,
            async_openai::types::FinishReason::ContentFilter => FinishReason::ContentFilter,
            async_openai::types::FinishReason::FunctionCall => FinishReason::ToolCalls,
        });

        Ok(ChatResponse {
            message,
            model: response.model,
            usage,
            finish_reason,
        })
    }
}

fn arguments_to_string(arguments: &Value) -> String {
    match arguments {
        Value::String(raw) => raw.clone(),
        Value::Null => "{}".to_string(),
        other => other.to_string(),
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let converted_messages = self.convert_messages(request.messages);
        let converted_tools = self.convert_tools(request.tools);

        tracing::debug!(
            "OpenAI request with {} messages and {} tools",
            converted_messages.len(),
            converted_tools.len()
        );

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder.model(&request.model);
        request_builder.messages(converted_messages);

        if !converted_tools.is_empty() {
            request_builder.tools(converted_tools);
        }

        if let Some(opts) = request.options {
            if let Some(max_tokens) = opts.max_tokens {
                request_builder.max_completion_tokens(max_tokens);
            }
            if let Some(temperature) = opts.temperature {
                request_builder.temperature(temperature);
            }
            if let Some(top_p) = opts.top_p {
                request_builder.top_p(top_p);
            }
            if opts.top_k.is_some() || opts.stop.is_some() {
                tracing::debug!(
                    "top_k and stop sequences are not sent to OpenAI-compatible endpoints"
                );
            }
        }

        let built = request_builder.build().map_err(|e| {
            tracing::error!("Failed to build OpenAI request: {}", e);
            LlmError::InvalidRequest {
                message: format!("Failed to build request: {}", e),
            }
        })?;

        let response = self.client.chat().create(built).await.map_err(|e| {
            tracing::error!("OpenAI API call failed: {}", e);
            match e {
                async_openai::error::OpenAIError::Reqwest(err) => LlmError::Network {
                    message: err.to_string(),
                },
                other => LlmError::ApiError {
                    status: 500, // async-openai doesn't expose status codes directly
                    message: other.to_string(),
                },
            }
        })?;

        let result = self.convert_response(response);
        if let Ok(response) = &result {
            if response.message.has_tool_calls() {
                for call in response.message.tool_calls() {
                    tracing::debug!(
                        "Tool call: {} (id: {})",
                        call.function.name,
                        call.id.as_deref().unwrap_or("-")
                    );
                }
            }
        }

        result
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}
