//! Model endpoint implementations

pub mod ollama;
pub mod openai;

pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

use crate::config::{Protocol, ResolvedLlmConfig};
use crate::error::{ConfigError, Result};
use crate::llm::LlmClient;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::sync::Arc;

/// Create the client matching the configured protocol
pub fn create_client(config: &ResolvedLlmConfig) -> Result<Arc<dyn LlmClient>> {
    config.validate()?;

    let client: Arc<dyn LlmClient> = match config.protocol {
        Protocol::Ollama => Arc::new(OllamaClient::new(config)?),
        Protocol::OpenAICompat => Arc::new(OpenAiClient::new(config)?),
    };

    tracing::debug!(
        "Created {} client for model {}",
        client.provider_name(),
        client.model_name()
    );

    Ok(client)
}

/// Convert configured extra headers into a reqwest header map
pub(crate) fn build_header_map(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();

    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|_| ConfigError::InvalidValue {
            field: "headers".to_string(),
            value: key.clone(),
        })?;
        let value = HeaderValue::from_str(value).map_err(|_| ConfigError::InvalidValue {
            field: format!("headers.{}", key),
            value: value.clone(),
        })?;
        map.insert(name, value);
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_by_protocol() {
        let ollama = create_client(&ResolvedLlmConfig::ollama("functiongemma:270m")).unwrap();
        assert_eq!(ollama.provider_name(), "ollama");
        assert_eq!(ollama.model_name(), "functiongemma:270m");

        let openai = create_client(&ResolvedLlmConfig::new(
            Protocol::OpenAICompat,
            "https://api.openai.com/v1".to_string(),
            "sk-test".to_string(),
            "gpt-4o-mini".to_string(),
        ))
        .unwrap();
        assert_eq!(openai.provider_name(), "openai");
    }

    #[test]
    fn test_create_client_validates_config() {
        let config = ResolvedLlmConfig::new(
            Protocol::OpenAICompat,
            "https://api.openai.com/v1".to_string(),
            String::new(),
            "gpt-4o-mini".to_string(),
        );
        assert!(create_client(&config).is_err());
    }

    #[test]
    fn test_build_header_map_rejects_invalid_names() {
        let mut headers = HashMap::new();
        headers.insert("X-Trace".to_string(), "abc".to_string());
        assert_eq!(build_header_map(&headers).unwrap().len(), 1);

        headers.insert("bad header".to_string(), "x".to_string());
        assert!(build_header_map(&headers).is_err());
    }
}
