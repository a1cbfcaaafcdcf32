//! Projection of the canonical generation config onto an xAI request.

use super::types::{
    CodeExecution, CollectionsSearch, FormatType, FunctionTool, GetCompletionsRequest, Mcp,
    ResponseFormat, Tool, ToolChoice, ToolMode, WebSearch,
};
use crate::types::{FunctionCallingMode, GenerationConfig};
use serde_json::Value;
use std::sync::Arc;

/// A deferred edit of an xAI completion request.
pub type ChatOption = Arc<dyn Fn(&mut GetCompletionsRequest) + Send + Sync>;

fn encode(value: &Value) -> Option<String> {
    match serde_json::to_string(value) {
        Ok(raw) => Some(raw),
        Err(err) => {
            tracing::warn!(error = %err, "failed to encode schema for xai");
            None
        }
    }
}

/// Fields of a [`GetCompletionsRequest`] set by a [`GenerationConfig`].
#[derive(Debug, Clone, Default, PartialEq)]
struct Overrides {
    temperature: Option<f32>,
    top_p: Option<f32>,
    max_tokens: Option<i32>,
    seed: Option<i32>,
    stop: Vec<String>,
    logprobs: bool,
    top_logprobs: Option<i32>,
    frequency_penalty: Option<f32>,
    presence_penalty: Option<f32>,
    tools: Vec<Tool>,
    tool_choice: Option<ToolChoice>,
    response_format: Option<ResponseFormat>,
}

impl Overrides {
    fn from_config(config: &GenerationConfig) -> Self {
        let mut out = Overrides {
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config
                .max_output_tokens
                .filter(|n| *n > 0)
                .map(|n| i32::try_from(n).unwrap_or(i32::MAX)),
            seed: config.seed,
            stop: config.stop_sequences.clone(),
            top_logprobs: config.logprobs,
            frequency_penalty: config.frequency_penalty,
            presence_penalty: config.presence_penalty,
            ..Default::default()
        };
        out.logprobs = config.response_logprobs || out.top_logprobs.is_some();

        for tool in &config.tools {
            for decl in tool.function_declarations.iter().filter(|d| !d.name.is_empty()) {
                out.tools.push(Tool::Function(FunctionTool {
                    name: decl.name.clone(),
                    description: decl.description.clone(),
                    parameters: decl.schema().and_then(encode).unwrap_or_default(),
                }));
            }
            if tool.code_execution.is_some() {
                out.tools.push(Tool::CodeExecution(CodeExecution {}));
            }
            if let Some(search) = &tool.web_search {
                out.tools.push(Tool::WebSearch(WebSearch {
                    excluded_domains: search.excluded_domains.clone(),
                    allowed_domains: search.allowed_domains.clone(),
                    enable_image_understanding: None,
                }));
            }
            if let Some(search) = &tool.collections_search {
                out.tools.push(Tool::CollectionsSearch(CollectionsSearch {
                    collection_ids: search.collection_ids.clone(),
                    limit: search.limit.map(|n| i32::try_from(n).unwrap_or(i32::MAX)),
                }));
            }
            if let Some(mcp) = &tool.mcp {
                out.tools.push(Tool::Mcp(Mcp {
                    server_url: mcp.server_url.clone(),
                    server_label: mcp.server_label.clone(),
                    server_description: mcp.server_description.clone(),
                    allowed_tool_names: mcp.allowed_tool_names.clone(),
                    authorization: mcp.authorization.clone().filter(|a| !a.is_empty()),
                    extra_headers: mcp.extra_headers.clone(),
                }));
            }
        }

        let allowed = config.allowed_function_names();
        out.tool_choice = match config.function_calling_mode() {
            Some(FunctionCallingMode::None) => Some(ToolChoice::Mode(ToolMode::None)),
            Some(FunctionCallingMode::Any) => match allowed {
                [name] if !name.is_empty() => Some(ToolChoice::FunctionName(name.clone())),
                _ => Some(ToolChoice::Mode(ToolMode::Required)),
            },
            Some(FunctionCallingMode::Auto) => Some(ToolChoice::Mode(ToolMode::Auto)),
            None => None,
        };

        out.response_format = match config.response_schema_value() {
            Some(schema) => encode(schema).map(|schema| ResponseFormat {
                format_type: FormatType::JsonSchema,
                schema: Some(schema),
            }),
            None if config.wants_json_object() => Some(ResponseFormat {
                format_type: FormatType::JsonObject,
                schema: None,
            }),
            None => None,
        };

        out
    }

    fn is_noop(&self) -> bool {
        *self == Overrides::default()
    }

    fn apply(&self, req: &mut GetCompletionsRequest) {
        if self.max_tokens.is_some() {
            req.max_tokens = self.max_tokens;
        }
        if self.seed.is_some() {
            req.seed = self.seed;
        }
        if self.temperature.is_some() {
            req.temperature = self.temperature;
        }
        if self.top_p.is_some() {
            req.top_p = self.top_p;
        }
        req.stop.extend(self.stop.iter().cloned());
        if self.logprobs {
            req.logprobs = true;
        }
        if self.top_logprobs.is_some() {
            req.top_logprobs = self.top_logprobs;
        }
        if self.frequency_penalty.is_some() {
            req.frequency_penalty = self.frequency_penalty;
        }
        if self.presence_penalty.is_some() {
            req.presence_penalty = self.presence_penalty;
        }
        req.tools.extend(self.tools.iter().cloned());
        if self.tool_choice.is_some() {
            req.tool_choice = self.tool_choice.clone();
        }
        if self.response_format.is_some() {
            req.response_format = self.response_format.clone();
        }
    }
}

/// Build a [`ChatOption`] writing `config` into a completion request.
///
/// Only fields present in the config are written. Returns `None` when the
/// config would not change the request at all.
pub fn chat_options(config: Option<&GenerationConfig>) -> Option<ChatOption> {
    let overrides = Overrides::from_config(config?);
    if overrides.is_noop() {
        return None;
    }
    Some(Arc::new(move |req: &mut GetCompletionsRequest| overrides.apply(req)))
}
