//! xAI chat completions translation.

pub mod aggregator;
pub mod convert;
pub mod options;
pub mod types;

pub use aggregator::XaiAggregator;
pub use convert::{completion_to_canonical, contents_to_messages};
pub use options::{chat_options, ChatOption};
pub use types::{GetChatCompletionResponse, GetCompletionsRequest};

use crate::factory::{ProviderConfig, ProviderKind};
use crate::normalize::{model_name, normalize_request};
use crate::params::ProviderParams;
use crate::provider::{Provider, StreamingProvider};
use crate::{Error, Request, Response};

/// Translator for the xAI chat completions API.
#[derive(Debug, Clone)]
pub struct XaiProvider {
    config: ProviderConfig,
    params: Option<ProviderParams>,
}

impl XaiProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            params: None,
        }
    }

    pub fn with_params(mut self, params: ProviderParams) -> Self {
        self.params = Some(params);
        self
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

impl Provider for XaiProvider {
    type Request = GetCompletionsRequest;
    type Response = GetChatCompletionResponse;

    fn kind(&self) -> ProviderKind {
        ProviderKind::Xai
    }

    fn build_request(&self, req: &mut Request) -> Result<GetCompletionsRequest, Error> {
        normalize_request(req, &self.config.user_agent);
        let messages = contents_to_messages(req.system.as_ref(), &req.contents)?;

        let mut params = GetCompletionsRequest {
            model: model_name(&self.config.model, req).to_string(),
            messages,
            ..Default::default()
        };

        if let Some(option) = chat_options(req.config.as_ref()) {
            option(&mut params);
        }

        let merged = ProviderParams::merge(self.params.as_ref(), req.provider_params.as_ref());
        if let Some(merged) = merged {
            for option in &merged.xai {
                option(&mut params);
            }
        }

        Ok(params)
    }

    fn parse_response(
        &self,
        response: &GetChatCompletionResponse,
        _req: &Request,
    ) -> Result<Response, Error> {
        Ok(completion_to_canonical(Some(response)))
    }
}

impl StreamingProvider for XaiProvider {
    type Aggregator = XaiAggregator;

    fn aggregator(&self, _req: &Request) -> XaiAggregator {
        XaiAggregator::new()
    }
}
