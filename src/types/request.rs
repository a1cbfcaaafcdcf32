use crate::params::ProviderParams;
use crate::types::{Content, GenerationConfig};

/// A provider-neutral generation request.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// Model name; the adapter default is used when blank.
    pub model: String,
    pub system: Option<Content>,
    pub contents: Vec<Content>,
    pub config: Option<GenerationConfig>,
    /// Provider-specific overrides applied after the adapter defaults.
    pub provider_params: Option<ProviderParams>,
}

impl Request {
    pub fn new(contents: Vec<Content>) -> Self {
        Self {
            contents,
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_system(mut self, system: Content) -> Self {
        self.system = Some(system);
        self
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_provider_params(mut self, params: ProviderParams) -> Self {
        self.provider_params = Some(params);
        self
    }

    /// Configured stop sequences, empty when there is no config.
    pub fn stop_sequences(&self) -> &[String] {
        self.config
            .as_ref()
            .map(|config| config.stop_sequences.as_slice())
            .unwrap_or_default()
    }
}
