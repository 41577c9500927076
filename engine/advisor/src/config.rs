use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the API key unless configured otherwise
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Chat-completions client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,

    /// Name of the environment variable read for the API key
    pub api_key_env: String,

    /// Explicit key; takes precedence over `api_key_env`. Never written out.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.4,
            max_tokens: 800,
            request_timeout_secs: 60,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
        }
    }
}

impl AdvisorConfig {
    /// Defaults overridden by `OPENAI_MODEL`, `OPENAI_TEMPERATURE` and `OPENAI_MAX_TOKENS`
    ///
    /// Unparsable numbers keep the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Apply the `OPENAI_*` overrides onto an existing config
    pub fn apply_env(&mut self) {
        if let Some(model) = std::env::var("OPENAI_MODEL").ok().filter(|m| !m.trim().is_empty()) {
            self.model = model.trim().to_string();
        }

        if let Some(temperature) = std::env::var("OPENAI_TEMPERATURE")
            .ok()
            .and_then(|t| t.trim().parse::<f32>().ok())
            .filter(|t| t.is_finite())
        {
            self.temperature = temperature;
        }

        if let Some(max_tokens) =
            std::env::var("OPENAI_MAX_TOKENS").ok().and_then(|t| t.trim().parse::<u32>().ok())
        {
            self.max_tokens = max_tokens;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Resolve the API key: explicit value first, then the environment
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.is_empty() {
            return Err("endpoint cannot be empty".to_string());
        }

        if self.model.trim().is_empty() {
            return Err("model cannot be empty".to_string());
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!("temperature must be between 0 and 2, got {}", self.temperature));
        }

        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }

        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }

        Ok(())
    }
}
