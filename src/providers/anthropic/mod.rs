//! Anthropic Messages API translation.

pub mod convert;
pub mod types;

pub use convert::{contents_to_messages, message_to_canonical, tools_from_config};
pub use types::{MessageResponse, MessagesRequest};

use crate::factory::{ProviderConfig, ProviderKind};
use crate::normalize::{model_name, normalize_request};
use crate::params::ProviderParams;
use crate::provider::Provider;
use crate::{Error, Request, Response};

/// `max_tokens` sent when the request does not set one; the API requires it.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Translator for the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    config: ProviderConfig,
    params: Option<ProviderParams>,
}

impl AnthropicProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            params: None,
        }
    }

    /// Default provider params, applied before any request-scoped params.
    pub fn with_params(mut self, params: ProviderParams) -> Self {
        self.params = Some(params);
        self
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

impl Provider for AnthropicProvider {
    type Request = MessagesRequest;
    type Response = MessageResponse;

    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn build_request(&self, req: &mut Request) -> Result<MessagesRequest, Error> {
        normalize_request(req, &self.config.user_agent);
        let (system, messages) = contents_to_messages(req.system.as_ref(), &req.contents)?;

        let mut params = MessagesRequest {
            model: model_name(&self.config.model, req).to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            system,
            messages,
            ..Default::default()
        };

        if let Some(config) = req.config.as_ref() {
            if let Some(max_tokens) = config.max_output_tokens.filter(|n| *n > 0) {
                params.max_tokens = max_tokens;
            }
            params.temperature = config.temperature;
            params.top_p = config.top_p;
            params.top_k = config.top_k.map(|k| k.max(0.0) as u32);
            params.stop_sequences = config.stop_sequences.clone();

            let (tools, tool_choice) = tools_from_config(config);
            params.tools = tools;
            params.tool_choice = tool_choice;
        }

        let merged = ProviderParams::merge(self.params.as_ref(), req.provider_params.as_ref());
        if let Some(merged) = merged {
            for mutate in &merged.anthropic {
                mutate(&mut params);
            }
        }

        Ok(params)
    }

    fn parse_response(
        &self,
        response: &MessageResponse,
        _req: &Request,
    ) -> Result<Response, Error> {
        message_to_canonical(Some(response))
    }
}
