use crate::providers::{AnthropicProvider, OpenAIProvider, XaiProvider};
use crate::Error;
use std::env;
use std::fmt;
use std::str::FromStr;

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Anthropic,
    OpenAI,
    Xai,
}

impl ProviderKind {
    /// Prefix of the environment variables read by [`ProviderConfig::from_env`].
    pub fn env_prefix(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "ANTHROPIC",
            ProviderKind::OpenAI => "OPENAI",
            ProviderKind::Xai => "XAI",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAI => "openai",
            ProviderKind::Xai => "xai",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "openai" => Ok(ProviderKind::OpenAI),
            "xai" | "grok" => Ok(ProviderKind::Xai),
            other => Err(Error::config(format!("unknown provider: {other}"))),
        }
    }
}

/// Default `User-Agent` sent with requests for `kind`.
pub fn default_user_agent(kind: ProviderKind) -> String {
    format!(
        "{}/{} ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        kind.name()
    )
}

/// Configuration for creating providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// Model used when a request does not name one.
    pub model: String,
    pub user_agent: String,
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind, model: impl Into<String>) -> Self {
        Self {
            kind,
            model: model.into(),
            user_agent: default_user_agent(kind),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Create configuration from environment variables.
    ///
    /// Reads `<PREFIX>_MODEL` (required) and `<PREFIX>_USER_AGENT`, where the
    /// prefix is `ANTHROPIC`, `OPENAI` or `XAI`.
    pub fn from_env(kind: ProviderKind) -> Result<Self, Error> {
        Self::from_lookup(kind, |key| env::var(key).ok())
    }

    /// Like [`ProviderConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(kind: ProviderKind, lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefix = kind.env_prefix();
        let model = lookup(&format!("{prefix}_MODEL"))
            .map(|model| model.trim().to_string())
            .filter(|model| !model.is_empty())
            .ok_or_else(|| {
                Error::config(format!(
                    "{prefix}_MODEL environment variable is required for {kind} provider"
                ))
            })?;

        let mut config = Self::new(kind, model);
        if let Some(user_agent) = lookup(&format!("{prefix}_USER_AGENT")) {
            if !user_agent.trim().is_empty() {
                config.user_agent = user_agent.trim().to_string();
            }
        }
        Ok(config)
    }
}

/// A provider of any supported kind.
#[derive(Debug, Clone)]
pub enum AnyProvider {
    Anthropic(AnthropicProvider),
    OpenAI(OpenAIProvider),
    Xai(XaiProvider),
}

impl AnyProvider {
    pub fn kind(&self) -> ProviderKind {
        match self {
            AnyProvider::Anthropic(_) => ProviderKind::Anthropic,
            AnyProvider::OpenAI(_) => ProviderKind::OpenAI,
            AnyProvider::Xai(_) => ProviderKind::Xai,
        }
    }
}

/// Factory for creating providers.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider from configuration.
    pub fn create(config: ProviderConfig) -> Result<AnyProvider, Error> {
        if config.model.trim().is_empty() {
            return Err(Error::config("model must not be empty"));
        }

        Ok(match config.kind {
            ProviderKind::Anthropic => AnyProvider::Anthropic(AnthropicProvider::new(config)),
            ProviderKind::OpenAI => AnyProvider::OpenAI(OpenAIProvider::new(config)),
            ProviderKind::Xai => AnyProvider::Xai(XaiProvider::new(config)),
        })
    }

    /// Create a provider from environment variables. `LLM_PROVIDER` selects
    /// the provider kind.
    pub fn from_env() -> Result<AnyProvider, Error> {
        let kind: ProviderKind = env::var("LLM_PROVIDER")
            .map_err(|_| Error::config("LLM_PROVIDER environment variable is required"))?
            .parse()?;
        Self::create(ProviderConfig::from_env(kind)?)
    }
}
