//! AI provider configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// OpenAI API key
    pub openai_api_key: Option<Secret<String>>,

    /// Anthropic API key
    pub anthropic_api_key: Option<Secret<String>>,

    /// Primary AI provider
    #[serde(default = "default_provider")]
    pub primary_provider: AiProvider,

    /// Used when the primary fails with a transient error
    pub fallback_provider: Option<AiProvider>,

    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,

    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Per-call timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on failure
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// Completion length limit for every call
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    pub temperature: Option<f32>,
}

/// AI provider type
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    OpenAI,
    #[default]
    Anthropic,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if OpenAI is configured
    pub fn has_openai(&self) -> bool {
        has_key(&self.openai_api_key)
    }

    /// Check if Anthropic is configured
    pub fn has_anthropic(&self) -> bool {
        has_key(&self.anthropic_api_key)
    }

    fn has_provider(&self, provider: AiProvider) -> bool {
        match provider {
            AiProvider::OpenAI => self.has_openai(),
            AiProvider::Anthropic => self.has_anthropic(),
        }
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_openai() && !self.has_anthropic() {
            return Err(ValidationError::NoAiProviderConfigured);
        }

        if !self.has_provider(self.primary_provider) {
            return Err(ValidationError::MissingRequired(key_name(self.primary_provider)));
        }

        if let Some(fallback) = self.fallback_provider {
            if !self.has_provider(fallback) {
                return Err(ValidationError::MissingRequired(key_name(fallback)));
            }
        }

        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        if self
            .temperature
            .is_some_and(|t| !(0.0..=2.0).contains(&t))
        {
            return Err(ValidationError::InvalidTemperature);
        }

        Ok(())
    }
}

fn has_key(key: &Option<Secret<String>>) -> bool {
    use secrecy::ExposeSecret;
    key.as_ref().is_some_and(|k| !k.expose_secret().is_empty())
}

fn key_name(provider: AiProvider) -> &'static str {
    match provider {
        AiProvider::OpenAI => "OPENAI_API_KEY",
        AiProvider::Anthropic => "ANTHROPIC_API_KEY",
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            anthropic_api_key: None,
            primary_provider: default_provider(),
            fallback_provider: None,
            anthropic_model: default_anthropic_model(),
            openai_model: default_openai_model(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            max_tokens: default_max_tokens(),
            temperature: None,
        }
    }
}

fn default_provider() -> AiProvider {
    AiProvider::Anthropic
}

fn default_anthropic_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> u32 {
    3
}

fn default_max_tokens() -> u32 {
    1024
}
