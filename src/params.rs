//! Provider-specific tuning that the canonical config cannot express.

use crate::providers::anthropic::MessagesRequest;
use crate::providers::openai::ResponsesRequest;
use crate::providers::xai::{ChatOption, GetCompletionsRequest};
use std::fmt;
use std::sync::Arc;

/// Mutates a native Anthropic request after canonical fields are applied.
pub type AnthropicMutator = Arc<dyn Fn(&mut MessagesRequest) + Send + Sync>;

/// Mutates a native OpenAI Responses request after canonical fields are applied.
pub type OpenAIMutator = Arc<dyn Fn(&mut ResponsesRequest) + Send + Sync>;

/// Per-provider request mutators. Providers hold defaults and requests may
/// carry overrides; defaults run first so overrides win.
#[derive(Clone, Default)]
pub struct ProviderParams {
    pub anthropic: Vec<AnthropicMutator>,
    pub openai: Vec<OpenAIMutator>,
    pub xai: Vec<ChatOption>,
}

impl ProviderParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_anthropic<F>(mut self, mutate: F) -> Self
    where
        F: Fn(&mut MessagesRequest) + Send + Sync + 'static,
    {
        self.anthropic.push(Arc::new(mutate));
        self
    }

    pub fn with_openai<F>(mut self, mutate: F) -> Self
    where
        F: Fn(&mut ResponsesRequest) + Send + Sync + 'static,
    {
        self.openai.push(Arc::new(mutate));
        self
    }

    pub fn with_xai<F>(mut self, option: F) -> Self
    where
        F: Fn(&mut GetCompletionsRequest) + Send + Sync + 'static,
    {
        self.xai.push(Arc::new(option));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.anthropic.is_empty() && self.openai.is_empty() && self.xai.is_empty()
    }

    /// Defaults followed by overrides. `None` when neither has anything.
    pub fn merge(
        defaults: Option<&ProviderParams>,
        overrides: Option<&ProviderParams>,
    ) -> Option<ProviderParams> {
        let mut merged = defaults.cloned().unwrap_or_default();
        if let Some(overrides) = overrides {
            merged.anthropic.extend(overrides.anthropic.iter().cloned());
            merged.openai.extend(overrides.openai.iter().cloned());
            merged.xai.extend(overrides.xai.iter().cloned());
        }

        (!merged.is_empty()).then_some(merged)
    }
}

impl fmt::Debug for ProviderParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderParams")
            .field("anthropic", &self.anthropic.len())
            .field("openai", &self.openai.len())
            .field("xai", &self.xai.len())
            .finish()
    }
}
