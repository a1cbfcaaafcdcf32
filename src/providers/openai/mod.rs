//! OpenAI Responses API translation.

pub mod aggregator;
pub mod convert;
pub mod types;

pub use aggregator::ResponsesAggregator;
pub use convert::{contents_to_input, response_to_canonical, tools_from_config};
pub use types::{ResponseStreamEvent, ResponsesRequest, ResponsesResponse};

use crate::factory::{ProviderConfig, ProviderKind};
use crate::normalize::{model_name, normalize_request};
use crate::params::ProviderParams;
use crate::provider::{Provider, StreamingProvider};
use crate::util::system_text;
use crate::{Error, Request, Response};

/// Translator for the OpenAI Responses API.
#[derive(Debug, Clone)]
pub struct OpenAIProvider {
    config: ProviderConfig,
    params: Option<ProviderParams>,
}

impl OpenAIProvider {
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

impl Provider for OpenAIProvider {
    type Request = ResponsesRequest;
    type Response = ResponsesResponse;

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAI
    }

    fn build_request(&self, req: &mut Request) -> Result<ResponsesRequest, Error> {
        normalize_request(req, &self.config.user_agent);
        let input = contents_to_input(&req.contents)?;
        let instructions = system_text(req.system.as_ref());

        let mut params = ResponsesRequest {
            model: model_name(&self.config.model, req).to_string(),
            input,
            instructions: (!instructions.is_empty()).then_some(instructions),
            ..Default::default()
        };

        if let Some(config) = req.config.as_ref() {
            params.temperature = config.temperature;
            params.top_p = config.top_p;
            params.max_output_tokens = config.max_output_tokens;
            params.top_logprobs = config.logprobs;
            params.text = convert::text_format(config);

            let (tools, tool_choice) = tools_from_config(config);
            params.tools = tools;
            params.tool_choice = tool_choice;
        }

        let merged = ProviderParams::merge(self.params.as_ref(), req.provider_params.as_ref());
        if let Some(merged) = merged {
            for mutate in &merged.openai {
                mutate(&mut params);
            }
        }

        Ok(params)
    }

    fn parse_response(
        &self,
        response: &ResponsesResponse,
        req: &Request,
    ) -> Result<Response, Error> {
        response_to_canonical(Some(response), req.stop_sequences())
    }
}

impl StreamingProvider for OpenAIProvider {
    type Aggregator = ResponsesAggregator;

    fn aggregator(&self, req: &Request) -> ResponsesAggregator {
        ResponsesAggregator::new(req.stop_sequences().to_vec())
    }
}
