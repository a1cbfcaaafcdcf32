//! Conversions between canonical types and xAI chat messages.

use super::types::{
    Content as XaiContent, FileContent, FunctionCall as XaiFunctionCall, GetChatCompletionResponse,
    Message, MessageRole, SamplingUsage, ToolCall,
};
use crate::args::parse_args_lenient;
use crate::types::{
    Content, FinishReason, FunctionResponse, JsonObject, Part, Response, Role, UsageMetadata,
};
use crate::util::system_text;
use crate::Error;
use serde_json::Value;
use std::collections::BTreeMap;

pub const FINISH_REASON_KEY: &str = "xai_finish_reason";
pub const SYSTEM_FINGERPRINT_KEY: &str = "xai_system_fingerprint";
pub const CITATIONS_KEY: &str = "xai_citations";
pub const TOOL_CALL_ARGS_ERRORS_KEY: &str = "tool_call_args_errors";

/// Error code of the response produced for a missing payload.
pub const NIL_RESPONSE: &str = "NIL_RESPONSE";

fn message_role(role: Role) -> Option<MessageRole> {
    match role {
        Role::User => Some(MessageRole::User),
        Role::Model => Some(MessageRole::Assistant),
        Role::System => Some(MessageRole::System),
        Role::Developer => None,
    }
}

/// Convert canonical contents into xAI chat messages.
///
/// The system content, if it has any text, becomes a leading system message.
/// A user content carrying function responses is sent with the tool role.
pub fn contents_to_messages(
    system: Option<&Content>,
    contents: &[Content],
) -> Result<Vec<Message>, Error> {
    let mut messages = Vec::with_capacity(contents.len() + 1);

    let system = system_text(system);
    if !system.is_empty() {
        messages.push(Message {
            role: MessageRole::System,
            content: vec![XaiContent::Text(system)],
            ..Default::default()
        });
    }

    for (ci, content) in contents.iter().enumerate() {
        messages.push(content_to_message(ci, content)?);
    }

    if messages.is_empty() {
        return Err(Error::NoMessages);
    }
    Ok(messages)
}

fn content_to_message(ci: usize, content: &Content) -> Result<Message, Error> {
    let role = message_role(content.role).ok_or_else(|| {
        Error::invalid_content(ci, format!("unsupported role {:?}", content.role.as_str()))
    })?;
    let mut msg = Message {
        role,
        ..Default::default()
    };

    for (pi, part) in content.parts.iter().enumerate() {
        match part {
            Part::Text(text) => {
                if !text.is_empty() {
                    msg.content.push(XaiContent::Text(text.clone()));
                }
            }
            Part::FunctionCall(call) => {
                if call.name.is_empty() {
                    return Err(Error::invalid_part(ci, pi, "function call missing name"));
                }
                let arguments = if call.args.is_empty() {
                    String::new()
                } else {
                    serde_json::to_string(&call.args)?
                };
                msg.tool_calls.push(ToolCall {
                    id: call.id.clone().unwrap_or_default(),
                    function: Some(XaiFunctionCall {
                        name: call.name.clone(),
                        arguments,
                    }),
                });
            }
            Part::FunctionResponse(resp) => {
                if resp.name.is_empty() {
                    return Err(Error::invalid_part(ci, pi, "function response missing name"));
                }
                if msg.role == MessageRole::User {
                    msg.role = MessageRole::Tool;
                }
                msg.content.push(XaiContent::Text(encode_function_response(resp)?));
            }
            Part::FileData(file) => {
                msg.content.push(XaiContent::File(FileContent {
                    file_id: file.file_uri.clone(),
                }));
            }
            Part::Thought(_) | Part::InlineData(_) => return Err(Error::unsupported(ci, pi)),
        }
    }

    if msg.content.is_empty() && msg.tool_calls.is_empty() {
        return Err(Error::invalid_content(
            ci,
            "message has neither content nor tool calls",
        ));
    }
    Ok(msg)
}

fn encode_function_response(resp: &FunctionResponse) -> Result<String, Error> {
    let mut payload = JsonObject::new();
    payload.insert("name".to_string(), Value::String(resp.name.clone()));
    if let Some(id) = resp.id.as_deref().filter(|id| !id.is_empty()) {
        payload.insert("tool_call_id".to_string(), Value::String(id.to_string()));
    }
    if !resp.response.is_empty() {
        payload.insert("response".to_string(), Value::Object(resp.response.clone()));
    }
    Ok(serde_json::to_string(&payload)?)
}

/// Convert an xAI completion into a canonical response.
///
/// Never fails: a missing payload yields a response carrying
/// [`NIL_RESPONSE`] as its error code.
pub fn completion_to_canonical(resp: Option<&GetChatCompletionResponse>) -> Response {
    let Some(resp) = resp else {
        return Response {
            error_code: Some(NIL_RESPONSE.to_string()),
            error_message: Some("xAI response is nil".to_string()),
            ..Default::default()
        };
    };

    let mut parts = Vec::with_capacity(3);
    let reasoning = resp.reasoning_content();
    if !reasoning.is_empty() {
        parts.push(Part::thought(reasoning));
    }
    let content = resp.content();
    if !content.is_empty() {
        parts.push(Part::text(content));
    }

    let mut arg_errors = Vec::new();
    for call in resp.tool_calls() {
        let Some(function) = call.function.as_ref() else {
            continue;
        };
        let (args, err) = parse_args_lenient(&function.arguments);
        if let Some(err) = err {
            arg_errors.push(Value::String(err));
        }
        parts.push(Part::function_call(
            Some(call.id.clone()).filter(|id| !id.is_empty()),
            function.name.clone(),
            args,
        ));
    }

    let raw_reason = resp.finish_reason();
    let mut custom = BTreeMap::new();
    if !raw_reason.is_empty() {
        custom.insert(FINISH_REASON_KEY.to_string(), Value::String(raw_reason.to_string()));
    }
    if !resp.system_fingerprint.is_empty() {
        custom.insert(
            SYSTEM_FINGERPRINT_KEY.to_string(),
            Value::String(resp.system_fingerprint.clone()),
        );
    }
    if !resp.citations.is_empty() {
        custom.insert(
            CITATIONS_KEY.to_string(),
            Value::Array(resp.citations.iter().cloned().map(Value::String).collect()),
        );
    }
    if !arg_errors.is_empty() {
        custom.insert(TOOL_CALL_ARGS_ERRORS_KEY.to_string(), Value::Array(arg_errors));
    }

    Response {
        content: Some(Content::new(Role::Model, parts)),
        usage_metadata: resp.usage.as_ref().map(usage_metadata),
        finish_reason: finish_reason(raw_reason),
        custom_metadata: (!custom.is_empty()).then_some(custom),
        ..Default::default()
    }
}

fn usage_metadata(usage: &SamplingUsage) -> UsageMetadata {
    UsageMetadata {
        prompt_token_count: usage.prompt_tokens,
        candidates_token_count: usage.completion_tokens,
        total_token_count: usage.total_tokens,
        cached_content_token_count: Some(usage.cached_prompt_text_tokens).filter(|n| *n > 0),
        thoughts_token_count: Some(usage.reasoning_tokens).filter(|n| *n > 0),
    }
}

/// Map a raw xAI finish reason such as `REASON_MAX_LEN`.
pub fn finish_reason(raw: &str) -> FinishReason {
    let upper = raw.to_ascii_uppercase();
    match upper.strip_prefix("REASON_").unwrap_or(&upper) {
        "" | "INVALID" => FinishReason::Unspecified,
        "STOP" => FinishReason::Stop,
        "MAX_LEN" | "MAX_CONTEXT" => FinishReason::MaxTokens,
        _ => FinishReason::Other,
    }
}
