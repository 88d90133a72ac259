//! CLI configuration loader for toolchat
//!
//! Implements single-source priority loading with flag overrides:
//! 1. --config file/dir (highest priority)
//! 2. Current working directory: ./toolchat.json or ./.toolchat/config.json
//! 3. Git repository root: <repo_root>/.toolchat/config.json
//! 4. User config: $XDG_CONFIG_HOME/toolchat/config.json or the platform config dir
//! 5. Environment variables only (no files)

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use toolchat_core::{ChatConfig, ModelParams, Protocol, ResolvedLlmConfig};
use tracing::debug;

/// Model used when nothing else is configured
pub const DEFAULT_OLLAMA_MODEL: &str = "functiongemma:270m";

/// Model used for OpenAI-compatible endpoints when none is configured
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Raw configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawConfig {
    /// Protocol to use ("ollama" or "openai")
    #[serde(default = "default_protocol")]
    pub protocol: String,
    /// API key (can be "env:VAR_NAME" for environment variable)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL (optional, uses protocol default if not specified)
    #[serde(default)]
    pub base_url: Option<String>,
    /// Model name
    pub model: String,
    #[serde(default)]
    pub params: ModelParams,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Conversation loop settings
    #[serde(default)]
    pub chat: ChatConfig,
}

fn default_protocol() -> String {
    Protocol::Ollama.as_str().to_string()
}

/// Fully resolved configuration for one CLI run
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub llm: ResolvedLlmConfig,
    pub chat: ChatConfig,
    /// File the configuration came from, `None` for environment only
    pub source: Option<PathBuf>,
}

/// CLI configuration loader
#[derive(Debug, Default)]
pub struct CliConfigLoader {
    config_override: Option<PathBuf>,
    protocol_override: Option<String>,
    api_key_override: Option<String>,
    base_url_override: Option<String>,
    model_override: Option<String>,
    max_tool_rounds_override: Option<usize>,
    timeout_override: Option<u64>,
    /// Directory searched instead of the process working directory
    working_dir: Option<PathBuf>,
    /// Directory searched instead of the user config directory
    user_config_dir: Option<PathBuf>,
    /// Replaces the process environment when set
    env: Option<HashMap<String, String>>,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Set config file/directory override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    pub fn with_protocol_override(mut self, protocol: String) -> Self {
        self.protocol_override = Some(protocol);
        self
    }

    pub fn with_api_key_override(mut self, api_key: String) -> Self {
        self.api_key_override = Some(api_key);
        self
    }

    pub fn with_base_url_override(mut self, base_url: String) -> Self {
        self.base_url_override = Some(base_url);
        self
    }

    pub fn with_model_override(mut self, model: String) -> Self {
        self.model_override = Some(model);
        self
    }

    pub fn with_max_tool_rounds_override(mut self, max_tool_rounds: usize) -> Self {
        self.max_tool_rounds_override = Some(max_tool_rounds);
        self
    }

    /// Set the model request timeout in seconds
    pub fn with_timeout_override(mut self, secs: u64) -> Self {
        self.timeout_override = Some(secs);
        self
    }

    /// Search this directory instead of the current one
    #[cfg(test)]
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = Some(dir);
        self
    }

    /// Search this directory instead of the user config directory
    #[cfg(test)]
    pub fn with_user_config_dir(mut self, dir: PathBuf) -> Self {
        self.user_config_dir = Some(dir);
        self
    }

    /// Resolve environment lookups from this map only
    #[cfg(test)]
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }

    /// Load and resolve configuration
    pub async fn load(&self) -> Result<LoadedConfig> {
        let (mut config, source) = if let Some(override_path) = &self.config_override {
            let path = expand_path(override_path);
            let (config, file) = self.load_from_path(&path).await.with_context(|| {
                format!(
                    "Failed to load config from override path: {}",
                    override_path.display()
                )
            })?;
            (config, Some(file))
        } else {
            self.search_and_load().await?
        };

        match &source {
            Some(path) => debug!("Loaded configuration from {}", path.display()),
            None => debug!("No config file found, using environment"),
        }

        if let Some(protocol) = &self.protocol_override {
            config.protocol = protocol.clone();
        }
        if let Some(api_key) = &self.api_key_override {
            config.api_key = Some(api_key.clone());
        }
        if let Some(base_url) = &self.base_url_override {
            config.base_url = Some(base_url.clone());
        }
        if let Some(model) = &self.model_override {
            config.model = model.clone();
        }
        if let Some(max_tool_rounds) = self.max_tool_rounds_override {
            config.chat.max_tool_rounds = max_tool_rounds;
        }
        if let Some(secs) = self.timeout_override {
            config.chat.request_timeout_secs = Some(secs);
        }

        let chat = config.chat.clone();
        chat.validate()
            .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

        let llm = self.resolve_config(config)?;
        Ok(LoadedConfig { llm, chat, source })
    }

    async fn search_and_load(&self) -> Result<(RawConfig, Option<PathBuf>)> {
        let cwd = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };

        let mut candidates = vec![
            cwd.join("toolchat.json"),
            cwd.join(".toolchat").join("config.json"),
        ];
        if let Some(git_root) = find_git_root(&cwd) {
            candidates.push(git_root.join(".toolchat").join("config.json"));
        }
        if let Some(config_dir) = self.user_config_dir() {
            candidates.push(config_dir.join("toolchat").join("config.json"));
        }

        for candidate in candidates {
            if candidate.is_file() {
                let config = self.load_file(&candidate).await?;
                return Ok((config, Some(candidate)));
            }
        }

        Ok((self.load_env_only()?, None))
    }

    /// Build a configuration from environment variables alone
    fn load_env_only(&self) -> Result<RawConfig> {
        let preference = self
            .protocol_override
            .clone()
            .or_else(|| self.env_var("TOOLCHAT_PROTOCOL"));
        let protocol = match preference {
            Some(name) => name
                .parse::<Protocol>()
                .map_err(|e| anyhow!("Invalid protocol: {}", e))?,
            None => Protocol::Ollama,
        };

        let generic_base_url = self.env_var("TOOLCHAT_BASE_URL");
        let generic_model = self.env_var("TOOLCHAT_MODEL");

        let config = match protocol {
            Protocol::Ollama => RawConfig {
                protocol: protocol.as_str().to_string(),
                api_key: None,
                base_url: self
                    .env_var("OLLAMA_HOST")
                    .map(|host| normalize_host(&host))
                    .or(generic_base_url),
                model: self
                    .env_var("OLLAMA_MODEL")
                    .or(generic_model)
                    .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
                params: ModelParams::default(),
                headers: HashMap::new(),
                chat: ChatConfig::default(),
            },
            Protocol::OpenAICompat => {
                let api_key = self
                    .api_key_override
                    .clone()
                    .or_else(|| self.env_var("OPENAI_API_KEY"))
                    .ok_or_else(|| {
                        anyhow!("Protocol 'openai' selected but OPENAI_API_KEY is not set")
                    })?;
                RawConfig {
                    protocol: protocol.as_str().to_string(),
                    api_key: Some(api_key),
                    base_url: self.env_var("OPENAI_BASE_URL").or(generic_base_url),
                    model: self
                        .env_var("OPENAI_MODEL")
                        .or(generic_model)
                        .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                    params: ModelParams::default(),
                    headers: HashMap::new(),
                    chat: ChatConfig::default(),
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific path (file or directory)
    async fn load_from_path(&self, path: &Path) -> Result<(RawConfig, PathBuf)> {
        if path.is_file() {
            Ok((self.load_file(path).await?, path.to_path_buf()))
        } else if path.is_dir() {
            let config_file = path.join("config.json");
            if config_file.is_file() {
                Ok((self.load_file(&config_file).await?, config_file))
            } else {
                Err(anyhow!(
                    "No config.json found in directory: {}",
                    path.display()
                ))
            }
        } else {
            Err(anyhow!("Config path does not exist: {}", path.display()))
        }
    }

    async fn load_file(&self, path: &Path) -> Result<RawConfig> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn user_config_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.user_config_dir {
            return Some(dir.clone());
        }
        self.env_var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(dirs::config_dir)
    }

    fn env_var(&self, name: &str) -> Option<String> {
        let value = match &self.env {
            Some(env) => env.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    /// Resolve raw config to ResolvedLlmConfig
    fn resolve_config(&self, config: RawConfig) -> Result<ResolvedLlmConfig> {
        let protocol: Protocol = config
            .protocol
            .parse()
            .map_err(|e| anyhow!("Invalid protocol: {}", e))?;

        let api_key = match config.api_key {
            Some(key) => match key.strip_prefix("env:") {
                Some(var_name) => self
                    .env_var(var_name)
                    .ok_or_else(|| anyhow!("Environment variable not found: {}", var_name))?,
                None => key,
            },
            None => String::new(),
        };

        let base_url = config
            .base_url
            .unwrap_or_else(|| protocol.default_base_url().to_string());

        let resolved = ResolvedLlmConfig::new(protocol, base_url, api_key, config.model)
            .with_params(config.params)
            .with_headers(config.headers);

        resolved
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

        Ok(resolved)
    }
}

/// Expand `~` and environment variables in a user-supplied path
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => path.to_path_buf(),
    }
}

/// `OLLAMA_HOST` is often given without a scheme
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}

fn find_git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}
