//! Chat session configuration structures

use super::session::ChatSession;
use crate::config::{ModelParams, ResolvedLlmConfig};
use crate::error::{ConfigError, Result};
use crate::llm::{create_client, LlmClient};
use crate::output::{ConversationOutput, NullOutput};
use crate::tools::ToolRegistry;
use crate::transcript::TranscriptRecorder;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for the conversation loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Maximum number of tool rounds per turn
    pub max_tool_rounds: usize,

    /// Upper bound for a single model request, in seconds
    pub request_timeout_secs: Option<u64>,

    /// System prompt prepended to every model request (optional)
    pub system_prompt: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: 10,
            request_timeout_secs: Some(120),
            system_prompt: None,
        }
    }
}

impl ChatConfig {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.max_tool_rounds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_tool_rounds".to_string(),
                value: "0".to_string(),
            });
        }

        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(())
    }

    /// Request timeout as a duration, `None` when unbounded
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

enum ModelSource {
    Config(ResolvedLlmConfig),
    Client {
        client: Arc<dyn LlmClient>,
        params: ModelParams,
    },
}

/// Builder for creating chat sessions
pub struct ChatSessionBuilder {
    model: ModelSource,
    chat_config: ChatConfig,
    registry: Arc<ToolRegistry>,
    output: Box<dyn ConversationOutput>,
    transcript: Option<TranscriptRecorder>,
}

impl ChatSessionBuilder {
    /// Create a builder that will connect using the resolved LLM configuration
    pub fn new(llm_config: ResolvedLlmConfig) -> Self {
        Self::with_source(ModelSource::Config(llm_config))
    }

    /// Create a builder around an existing client
    pub fn with_client(client: Arc<dyn LlmClient>) -> Self {
        Self::with_source(ModelSource::Client {
            client,
            params: ModelParams::default(),
        })
    }

    fn with_source(model: ModelSource) -> Self {
        Self {
            model,
            chat_config: ChatConfig::default(),
            registry: Arc::new(ToolRegistry::default()),
            output: Box::new(NullOutput),
            transcript: None,
        }
    }

    /// Set chat configuration
    pub fn with_chat_config(mut self, chat_config: ChatConfig) -> Self {
        self.chat_config = chat_config;
        self
    }

    /// Set maximum tool rounds
    pub fn with_max_tool_rounds(mut self, max_tool_rounds: usize) -> Self {
        self.chat_config.max_tool_rounds = max_tool_rounds;
        self
    }

    /// Set request timeout
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.chat_config.request_timeout_secs = timeout.map(|t| t.as_secs().max(1));
        self
    }

    /// Set system prompt
    pub fn with_system_prompt(mut self, system_prompt: Option<String>) -> Self {
        self.chat_config.system_prompt = system_prompt;
        self
    }

    /// Sampling parameters used when the builder owns a client
    pub fn with_model_params(mut self, model_params: ModelParams) -> Self {
        match &mut self.model {
            ModelSource::Config(config) => config.params = model_params,
            ModelSource::Client { params, .. } => *params = model_params,
        }
        self
    }

    /// Set the tool registry
    pub fn with_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Set the output handler
    pub fn with_output(mut self, output: Box<dyn ConversationOutput>) -> Self {
        self.output = output;
        self
    }

    /// Record every turn into a transcript
    pub fn with_transcript(mut self, recorder: TranscriptRecorder) -> Self {
        self.transcript = Some(recorder);
        self
    }

    /// Build the session
    pub fn build(self) -> Result<ChatSession> {
        self.chat_config.validate()?;

        let (client, params) = match self.model {
            ModelSource::Config(config) => {
                let client = create_client(&config)?;
                (client, config.params)
            }
            ModelSource::Client { client, params } => (client, params),
        };

        let mut session = ChatSession::new(client, self.registry, self.chat_config, params);
        session.set_output(self.output);
        if let Some(recorder) = self.transcript {
            session.set_transcript_recorder(recorder);
        }

        Ok(session)
    }
}
