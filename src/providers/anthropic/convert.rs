//! Conversions between canonical types and the Anthropic Messages API.

use super::types::{
    ContentBlock, InputSchema, Message, MessageResponse, MessageRole, StopReason, Tool, ToolChoice,
    ToolKind,
};
use crate::types::{
    Content, FinishReason, FunctionCallingMode, GenerationConfig, JsonObject, Part, Response, Role,
    UsageMetadata,
};
use crate::util::{system_text, tool_id};
use crate::Error;
use serde_json::Value;

/// Convert canonical contents into Anthropic system blocks and messages.
///
/// The system content's text parts become a single text block. Each content
/// maps to one message; user turns stay `user` and every other role becomes
/// `assistant`.
pub fn contents_to_messages(
    system: Option<&Content>,
    contents: &[Content],
) -> Result<(Vec<ContentBlock>, Vec<Message>), Error> {
    let mut system_blocks = Vec::new();
    let text = system_text(system);
    if !text.is_empty() {
        system_blocks.push(ContentBlock::text(text));
    }

    let mut messages = Vec::with_capacity(contents.len());
    for (ci, content) in contents.iter().enumerate() {
        let role = match content.role {
            Role::User => MessageRole::User,
            _ => MessageRole::Assistant,
        };

        let mut blocks = Vec::with_capacity(content.parts.len());
        for (pi, part) in content.parts.iter().enumerate() {
            match part {
                Part::Text(text) => {
                    if !text.is_empty() {
                        blocks.push(ContentBlock::text(text.as_str()));
                    }
                }
                Part::FunctionCall(call) => {
                    if call.name.is_empty() {
                        return Err(Error::invalid_part(ci, pi, "function call missing name"));
                    }
                    blocks.push(ContentBlock::ToolUse {
                        id: tool_id(call.id.as_deref(), ci, pi),
                        name: call.name.clone(),
                        input: Value::Object(call.args.clone()),
                    });
                }
                Part::FunctionResponse(resp) => {
                    if resp.name.is_empty() {
                        return Err(Error::invalid_part(ci, pi, "function response missing name"));
                    }
                    let payload = serde_json::to_string(&resp.response)?;
                    blocks.push(ContentBlock::ToolResult {
                        tool_use_id: tool_id(resp.id.as_deref(), ci, pi),
                        content: vec![ContentBlock::text(payload)],
                    });
                }
                Part::Thought(_) | Part::InlineData(_) | Part::FileData(_) => {
                    return Err(Error::unsupported(ci, pi));
                }
            }
        }

        if blocks.is_empty() {
            return Err(Error::invalid_content(ci, "empty parts"));
        }
        messages.push(Message {
            role,
            content: blocks,
        });
    }

    Ok((system_blocks, messages))
}

/// Convert function declarations into Anthropic custom tools, plus the tool
/// choice implied by the config.
///
/// Anthropic has no single-function forcing here, so `any` and `auto` both
/// map to `auto`.
pub fn tools_from_config(config: &GenerationConfig) -> (Vec<Tool>, Option<ToolChoice>) {
    if config.tools.is_empty() {
        return (Vec::new(), None);
    }

    let tools = config
        .tools
        .iter()
        .flat_map(|tool| tool.function_declarations.iter())
        .filter(|decl| !decl.name.is_empty())
        .map(|decl| Tool {
            name: decl.name.clone(),
            description: Some(decl.description.clone()),
            input_schema: object_schema(
                decl.parameters
                    .as_ref()
                    .or(decl.parameters_json_schema.as_ref()),
            ),
            kind: Some(ToolKind::Custom),
        })
        .collect();

    let choice = match config.function_calling_mode() {
        Some(FunctionCallingMode::None) => Some(ToolChoice::None),
        Some(FunctionCallingMode::Any) | Some(FunctionCallingMode::Auto) => Some(ToolChoice::Auto),
        None => None,
    };

    (tools, choice)
}

/// Build an object input schema from a parameter schema.
///
/// A full object schema contributes its `properties` and `required`; any
/// other object is taken to be the property map itself.
fn object_schema(parameters: Option<&Value>) -> InputSchema {
    let mut schema = InputSchema {
        kind: "object".to_string(),
        properties: None,
        required: Vec::new(),
    };

    let Some(Value::Object(params)) = parameters else {
        return schema;
    };

    match params.get("properties") {
        Some(properties) => {
            schema.properties = Some(properties.clone());
            if let Some(Value::Array(required)) = params.get("required") {
                schema.required = required
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect();
            }
        }
        None => schema.properties = Some(Value::Object(params.clone())),
    }

    schema
}

/// Convert an Anthropic message into a canonical model response.
pub fn message_to_canonical(message: Option<&MessageResponse>) -> Result<Response, Error> {
    let message = message.ok_or_else(|| Error::payload("nil anthropic message"))?;

    let mut parts = Vec::with_capacity(message.content.len());
    for block in &message.content {
        match block {
            ContentBlock::Text { text } => parts.push(Part::Text(text.clone())),
            ContentBlock::Thinking { thinking, .. } => parts.push(Part::Thought(thinking.clone())),
            ContentBlock::ToolUse { id, name, input } => {
                parts.push(Part::function_call(
                    Some(id.clone()),
                    name.clone(),
                    tool_input(input)?,
                ));
            }
            other => {
                tracing::debug!(block = ?other, "skipping anthropic content block");
            }
        }
    }

    let usage = &message.usage;
    let mut response = Response::from_parts(parts);
    response.usage_metadata = Some(UsageMetadata {
        prompt_token_count: usage.input_tokens,
        candidates_token_count: usage.output_tokens,
        total_token_count: usage.input_tokens + usage.output_tokens,
        cached_content_token_count: usage.cache_read_input_tokens,
        thoughts_token_count: None,
    });
    response.finish_reason = finish_reason(message.stop_reason);
    Ok(response)
}

/// Decode a tool_use input: a decoded object is used as is, a JSON string is
/// parsed, and a missing input is an empty object.
fn tool_input(input: &Value) -> Result<JsonObject, Error> {
    match input {
        Value::Null => Ok(JsonObject::new()),
        Value::Object(args) => Ok(args.clone()),
        Value::String(raw) if raw.trim().is_empty() => Ok(JsonObject::new()),
        Value::String(raw) => serde_json::from_str(raw)
            .map_err(|e| Error::payload(format!("unmarshal tool input: {e}"))),
        other => Err(Error::payload(format!(
            "unmarshal tool input: expected an object, got {other}"
        ))),
    }
}

pub fn finish_reason(reason: Option<StopReason>) -> FinishReason {
    match reason {
        Some(StopReason::StopSequence) | Some(StopReason::EndTurn) => FinishReason::Stop,
        Some(StopReason::MaxTokens) => FinishReason::MaxTokens,
        Some(StopReason::ToolUse) => FinishReason::Other,
        _ => FinishReason::Unspecified,
    }
}
