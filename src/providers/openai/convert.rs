//! Conversions between canonical types and the OpenAI Responses API.

use super::types::{
    IncompleteDetails, InputItem, InputRole, OutputContent, OutputItem, ResponseStatus,
    ResponseUsage, ResponsesResponse, ResponsesTool, TextConfig, TextFormat, ToolChoice,
    ToolChoiceMode, WebSearchFilters,
};
use crate::args::parse_args;
use crate::stop::trim_parts_at_stop;
use crate::types::{
    Content, FinishReason, FunctionCallingMode, GenerationConfig, JsonObject, Part, Response, Role,
    UsageMetadata,
};
use crate::util::tool_id;
use crate::Error;
use serde_json::{json, Value};

/// Map a canonical role onto a Responses input role.
pub fn input_role(role: Role) -> InputRole {
    match role {
        Role::User => InputRole::User,
        Role::Model => InputRole::Assistant,
        Role::System => InputRole::System,
        Role::Developer => InputRole::Developer,
    }
}

/// Convert canonical contents into Responses input items.
///
/// Adjacent text parts of one content are merged into a single message item.
/// A function call or response ends the current message and becomes its own
/// item, so the original part order is preserved.
pub fn contents_to_input(contents: &[Content]) -> Result<Vec<InputItem>, Error> {
    let mut items = Vec::with_capacity(contents.len());

    for (ci, content) in contents.iter().enumerate() {
        if content.parts.is_empty() {
            return Err(Error::invalid_content(ci, "empty parts"));
        }

        let role = input_role(content.role);
        let mut text = String::new();
        let flush = |text: &mut String, items: &mut Vec<InputItem>| {
            if !text.is_empty() {
                items.push(InputItem::Message {
                    role,
                    content: std::mem::take(text),
                });
            }
        };

        for (pi, part) in content.parts.iter().enumerate() {
            match part {
                Part::Text(t) => text.push_str(t),
                Part::FunctionCall(call) => {
                    flush(&mut text, &mut items);
                    if call.name.is_empty() {
                        return Err(Error::invalid_part(ci, pi, "function call missing name"));
                    }
                    items.push(InputItem::FunctionCall {
                        call_id: tool_id(call.id.as_deref(), ci, pi),
                        name: call.name.clone(),
                        arguments: serde_json::to_string(&call.args)?,
                    });
                }
                Part::FunctionResponse(resp) => {
                    flush(&mut text, &mut items);
                    if resp.name.is_empty() {
                        return Err(Error::invalid_part(ci, pi, "function response missing name"));
                    }
                    items.push(InputItem::FunctionCallOutput {
                        call_id: tool_id(resp.id.as_deref(), ci, pi),
                        output: serde_json::to_string(&resp.response)?,
                    });
                }
                Part::Thought(_) | Part::InlineData(_) | Part::FileData(_) => {
                    return Err(Error::unsupported(ci, pi));
                }
            }
        }

        flush(&mut text, &mut items);
    }

    Ok(items)
}

/// Convert the config's tools into Responses tools, plus the tool choice.
///
/// Only `none` and a single forced function have a Responses equivalent;
/// every other mode leaves the choice to the API default.
pub fn tools_from_config(config: &GenerationConfig) -> (Vec<ResponsesTool>, Option<ToolChoice>) {
    if config.tools.is_empty() {
        return (Vec::new(), None);
    }

    let mut tools = Vec::new();
    for tool in &config.tools {
        for decl in tool.function_declarations.iter().filter(|d| !d.name.is_empty()) {
            let description = decl.description.trim();
            tools.push(ResponsesTool::Function {
                name: decl.name.clone(),
                description: (!description.is_empty()).then(|| description.to_string()),
                parameters: decl.schema().filter(|schema| schema.is_object()).cloned(),
                strict: true,
            });
        }

        if let Some(search) = &tool.web_search {
            tools.push(ResponsesTool::WebSearch {
                filters: (!search.allowed_domains.is_empty()).then(|| WebSearchFilters {
                    allowed_domains: search.allowed_domains.clone(),
                }),
            });
        }
        if tool.code_execution.is_some() {
            tools.push(ResponsesTool::CodeInterpreter {
                container: json!({"type": "auto"}),
            });
        }
        if let Some(search) = &tool.collections_search {
            tools.push(ResponsesTool::FileSearch {
                vector_store_ids: search.collection_ids.clone(),
                max_num_results: search.limit,
            });
        }
        if let Some(mcp) = &tool.mcp {
            let mut headers = mcp.extra_headers.clone();
            if let Some(auth) = &mcp.authorization {
                headers.insert("Authorization".to_string(), auth.clone());
            }
            tools.push(ResponsesTool::Mcp {
                server_label: mcp.server_label.clone(),
                server_url: mcp.server_url.clone(),
                server_description: (!mcp.server_description.is_empty())
                    .then(|| mcp.server_description.clone()),
                allowed_tools: (!mcp.allowed_tool_names.is_empty())
                    .then(|| mcp.allowed_tool_names.clone()),
                headers,
                require_approval: "never".to_string(),
            });
        }
    }

    let allowed = config.allowed_function_names();
    let choice = match config.function_calling_mode() {
        Some(FunctionCallingMode::None) => Some(ToolChoice::Mode(ToolChoiceMode::None)),
        Some(FunctionCallingMode::Any) if allowed.len() == 1 => {
            Some(ToolChoice::function(allowed[0].clone()))
        }
        _ => None,
    };

    (tools, choice)
}

/// Structured-output format implied by the config.
pub fn text_format(config: &GenerationConfig) -> Option<TextConfig> {
    let format = match config.response_schema_value() {
        Some(schema) => TextFormat::JsonSchema {
            name: "response".to_string(),
            schema: schema.clone(),
            strict: true,
        },
        None if config.wants_json_object() => TextFormat::JsonObject,
        None => return None,
    };
    Some(TextConfig { format })
}

/// Convert a Responses payload into a canonical model response.
///
/// Text is cut at the first stop sequence; when that happens the finish
/// reason becomes [`FinishReason::Stop`].
pub fn response_to_canonical<S: AsRef<str>>(
    response: Option<&ResponsesResponse>,
    stop_sequences: &[S],
) -> Result<Response, Error> {
    let response = response.ok_or_else(|| Error::payload("nil openai response"))?;
    if response.output.is_empty() {
        return Err(Error::payload("empty output"));
    }

    let mut parts = Vec::with_capacity(response.output.len());
    let mut saw_text = false;

    for item in &response.output {
        match item {
            OutputItem::Message { content, .. } => {
                for c in content {
                    match c {
                        OutputContent::OutputText { text, .. } if !text.is_empty() => {
                            parts.push(Part::Text(text.clone()));
                            saw_text = true;
                        }
                        OutputContent::Refusal { refusal } if !refusal.is_empty() => {
                            parts.push(Part::Text(refusal.clone()));
                            saw_text = true;
                        }
                        _ => {}
                    }
                }
            }
            OutputItem::FunctionCall {
                id,
                call_id,
                name,
                arguments,
            } => {
                let id = if call_id.is_empty() { id } else { call_id };
                parts.push(Part::function_call(
                    Some(id.clone()).filter(|id| !id.is_empty()),
                    name.clone(),
                    parse_args(arguments),
                ));
            }
            OutputItem::ShellCallOutput {
                id,
                call_id,
                output,
            } => {
                let name = if call_id.is_empty() { id } else { call_id };
                let mut payload = JsonObject::new();
                payload.insert("output".to_string(), shell_output(output));
                parts.push(Part::function_response(
                    Some(id.clone()).filter(|id| !id.is_empty()),
                    name.clone(),
                    payload,
                ));
            }
            OutputItem::Unknown => {
                tracing::debug!("skipping unsupported openai output item");
            }
        }
    }

    if parts.is_empty() {
        return Err(Error::payload("no convertible output items"));
    }

    let mut finish = finish_reason(response.status, response.incomplete_details.as_ref());
    if saw_text && trim_parts_at_stop(&mut parts, stop_sequences) {
        finish = FinishReason::Stop;
    }

    let mut out = Response::from_parts(parts);
    out.usage_metadata = response.usage.as_ref().map(usage_metadata);
    out.finish_reason = finish;
    out.turn_complete = response.status.is_terminal_turn();
    Ok(out)
}

/// Shell output is either a list of entries or a plain string; anything
/// empty becomes null.
fn shell_output(output: &Value) -> Value {
    match output {
        Value::Array(entries) if !entries.is_empty() => output.clone(),
        Value::String(text) if !text.is_empty() => output.clone(),
        _ => Value::Null,
    }
}

pub fn usage_metadata(usage: &ResponseUsage) -> UsageMetadata {
    UsageMetadata {
        prompt_token_count: usage.input_tokens,
        candidates_token_count: usage.output_tokens,
        total_token_count: usage.total_tokens,
        cached_content_token_count: usage.input_tokens_details.as_ref().map(|d| d.cached_tokens),
        thoughts_token_count: usage
            .output_tokens_details
            .as_ref()
            .map(|d| d.reasoning_tokens),
    }
}

/// Derive the canonical finish reason from a response status.
pub fn finish_reason(status: ResponseStatus, details: Option<&IncompleteDetails>) -> FinishReason {
    match status {
        ResponseStatus::Completed => FinishReason::Stop,
        ResponseStatus::Incomplete => {
            let reason = details.map(|d| d.reason.to_ascii_lowercase());
            match reason.as_deref() {
                Some("max_output_tokens") => FinishReason::MaxTokens,
                Some("content_filter") => FinishReason::Safety,
                _ => FinishReason::Other,
            }
        }
        ResponseStatus::Failed => FinishReason::Other,
        _ => FinishReason::Unspecified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FunctionDeclaration, McpServer, Tool, ToolConfig};

    fn args(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn message(text: &str) -> OutputItem {
        OutputItem::Message {
            id: "msg_1".to_string(),
            content: vec![OutputContent::OutputText {
                text: text.to_string(),
                annotations: vec![],
            }],
        }
    }

    fn completed(output: Vec<OutputItem>) -> ResponsesResponse {
        ResponsesResponse {
            status: ResponseStatus::Completed,
            output,
            usage: Some(ResponseUsage {
                input_tokens: 3,
                output_tokens: 5,
                total_tokens: 8,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_adjacent_text_merged() {
        let contents = vec![Content::new(
            Role::User,
            vec![Part::text("Hello, "), Part::text("world")],
        )];
        let items = contents_to_input(&contents).unwrap();
        assert_eq!(
            items,
            vec![InputItem::Message {
                role: InputRole::User,
                content: "Hello, world".to_string(),
            }]
        );
    }

    #[test]
    fn test_function_call_splits_text() {
        let contents = vec![Content::new(
            Role::Model,
            vec![
                Part::text("Let me check."),
                Part::function_call(None, "lookup_city", args(json!({"city": "Paris"}))),
                Part::text("Done."),
            ],
        )];

        let items = contents_to_input(&contents).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(
            items[0],
            InputItem::Message {
                role: InputRole::Assistant,
                content: "Let me check.".to_string(),
            }
        );
        assert_eq!(
            items[1],
            InputItem::FunctionCall {
                call_id: "tool_0_1".to_string(),
                name: "lookup_city".to_string(),
                arguments: r#"{"city":"Paris"}"#.to_string(),
            }
        );
        assert!(matches!(&items[2], InputItem::Message { content, .. } if content == "Done."));
    }

    #[test]
    fn test_function_response_item() {
        let contents = vec![Content::new(
            Role::User,
            vec![Part::function_response(
                Some("call-1".to_string()),
                "lookup_city",
                args(json!({"temp": 21})),
            )],
        )];
        let items = contents_to_input(&contents).unwrap();
        assert_eq!(
            items,
            vec![InputItem::FunctionCallOutput {
                call_id: "call-1".to_string(),
                output: r#"{"temp":21}"#.to_string(),
            }]
        );
    }

    #[test]
    fn test_role_mapping() {
        assert_eq!(input_role(Role::User), InputRole::User);
        assert_eq!(input_role(Role::Model), InputRole::Assistant);
        assert_eq!(input_role(Role::System), InputRole::System);
        assert_eq!(input_role(Role::Developer), InputRole::Developer);
    }

    #[test]
    fn test_input_errors() {
        let contents = vec![Content::new(
            Role::Model,
            vec![Part::function_call(None, "", JsonObject::new())],
        )];
        assert_eq!(
            contents_to_input(&contents).unwrap_err().to_string(),
            "content[0] part[0]: function call missing name"
        );

        let contents = vec![Content::new(Role::User, vec![])];
        assert!(matches!(
            contents_to_input(&contents),
            Err(Error::InvalidInput { content: 0, part: None, .. })
        ));

        let contents = vec![Content::new(Role::Model, vec![Part::thought("hmm")])];
        assert!(matches!(
            contents_to_input(&contents),
            Err(Error::Unsupported { content: 0, part: 0 })
        ));
    }

    #[test]
    fn test_function_tools() {
        let config = GenerationConfig {
            tools: vec![Tool::functions(vec![
                FunctionDeclaration::new("lookup", "  Find a city.  ")
                    .with_parameters(json!({"type": "OBJECT"}))
                    .with_json_schema(json!({"type": "object", "properties": {}})),
                FunctionDeclaration::new("bare", "   "),
            ])],
            tool_config: Some(ToolConfig::force("lookup")),
            ..Default::default()
        };

        let (tools, choice) = tools_from_config(&config);
        assert_eq!(
            tools[0],
            ResponsesTool::Function {
                name: "lookup".to_string(),
                description: Some("Find a city.".to_string()),
                parameters: Some(json!({"type": "object", "properties": {}})),
                strict: true,
            }
        );
        assert!(matches!(
            &tools[1],
            ResponsesTool::Function { description: None, parameters: None, .. }
        ));
        assert_eq!(choice, Some(ToolChoice::function("lookup")));
    }

    #[test]
    fn test_tool_choice_modes() {
        let mut config = GenerationConfig {
            tools: vec![Tool::functions(vec![FunctionDeclaration::new("f", "")])],
            tool_config: Some(ToolConfig::mode(FunctionCallingMode::None)),
            ..Default::default()
        };
        assert_eq!(
            tools_from_config(&config).1,
            Some(ToolChoice::Mode(ToolChoiceMode::None))
        );

        config.tool_config = Some(ToolConfig::mode(FunctionCallingMode::Any));
        assert_eq!(tools_from_config(&config).1, None);

        config.tool_config = Some(ToolConfig::mode(FunctionCallingMode::Auto));
        assert_eq!(tools_from_config(&config).1, None);
    }

    #[test]
    fn test_builtin_tools() {
        let config = GenerationConfig {
            tools: vec![Tool {
                code_execution: Some(Default::default()),
                mcp: Some(McpServer {
                    server_url: "https://mcp.example.com".to_string(),
                    server_label: "docs".to_string(),
                    authorization: Some("Bearer t".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }],
            ..Default::default()
        };

        let (tools, _) = tools_from_config(&config);
        assert_eq!(tools.len(), 2);
        assert!(matches!(&tools[0], ResponsesTool::CodeInterpreter { .. }));
        match &tools[1] {
            ResponsesTool::Mcp { headers, require_approval, .. } => {
                assert_eq!(headers["Authorization"], "Bearer t");
                assert_eq!(require_approval, "never");
            }
            other => panic!("unexpected tool {other:?}"),
        }
    }

    #[test]
    fn test_text_format() {
        let mut config = GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            ..Default::default()
        };
        assert_eq!(
            text_format(&config),
            Some(TextConfig { format: TextFormat::JsonObject })
        );

        config.response_schema = Some(json!({"type": "object"}));
        assert!(matches!(
            text_format(&config),
            Some(TextConfig { format: TextFormat::JsonSchema { .. } })
        ));

        assert_eq!(text_format(&GenerationConfig::default()), None);
    }

    #[test]
    fn test_text_and_tool_call_response() {
        let response = completed(vec![
            message("hello"),
            OutputItem::FunctionCall {
                id: "fc_1".to_string(),
                call_id: "call-1".to_string(),
                name: "lookup_city".to_string(),
                arguments: r#"{"city":"Paris"}"#.to_string(),
            },
        ]);

        let out = response_to_canonical::<&str>(Some(&response), &[]).unwrap();
        assert_eq!(
            out.parts(),
            &[
                Part::text("hello"),
                Part::function_call(
                    Some("call-1".to_string()),
                    "lookup_city",
                    args(json!({"city": "Paris"}))
                ),
            ]
        );
        assert_eq!(out.finish_reason, FinishReason::Stop);
        assert!(out.turn_complete);
        let usage = out.usage_metadata.unwrap();
        assert_eq!(
            (usage.prompt_token_count, usage.candidates_token_count, usage.total_token_count),
            (3, 5, 8)
        );
    }

    #[test]
    fn test_function_call_falls_back_to_item_id() {
        let response = completed(vec![OutputItem::FunctionCall {
            id: "fc_7".to_string(),
            call_id: String::new(),
            name: "f".to_string(),
            arguments: "not json".to_string(),
        }]);
        let out = response_to_canonical::<&str>(Some(&response), &[]).unwrap();
        let call = out.function_calls()[0];
        assert_eq!(call.id.as_deref(), Some("fc_7"));
        assert_eq!(Value::Object(call.args.clone()), json!({"raw": "not json"}));
    }

    #[test]
    fn test_refusal_becomes_text() {
        let response = completed(vec![OutputItem::Message {
            id: String::new(),
            content: vec![OutputContent::Refusal {
                refusal: "I can't help with that.".to_string(),
            }],
        }]);
        let out = response_to_canonical::<&str>(Some(&response), &[]).unwrap();
        assert_eq!(out.text(), "I can't help with that.");
    }

    #[test]
    fn test_shell_call_output() {
        let response = completed(vec![
            OutputItem::ShellCallOutput {
                id: "sh_1".to_string(),
                call_id: "call_sh".to_string(),
                output: json!("ok\n"),
            },
            OutputItem::ShellCallOutput {
                id: "sh_2".to_string(),
                call_id: String::new(),
                output: json!([]),
            },
        ]);

        let out = response_to_canonical::<&str>(Some(&response), &[]).unwrap();
        match &out.parts()[0] {
            Part::FunctionResponse(resp) => {
                assert_eq!(resp.id.as_deref(), Some("sh_1"));
                assert_eq!(resp.name, "call_sh");
                assert_eq!(Value::Object(resp.response.clone()), json!({"output": "ok\n"}));
            }
            other => panic!("unexpected part {other:?}"),
        }
        match &out.parts()[1] {
            Part::FunctionResponse(resp) => {
                assert_eq!(resp.name, "sh_2");
                assert_eq!(Value::Object(resp.response.clone()), json!({"output": null}));
            }
            other => panic!("unexpected part {other:?}"),
        }
    }

    #[test]
    fn test_stop_sequence_overrides_finish() {
        let mut response = completed(vec![message("Hello<STOP>tail"), message("more")]);
        response.status = ResponseStatus::Incomplete;
        response.incomplete_details = Some(IncompleteDetails {
            reason: "max_output_tokens".to_string(),
        });

        let out = response_to_canonical(Some(&response), &["<STOP>"]).unwrap();
        assert_eq!(out.parts(), &[Part::text("Hello"), Part::text("")]);
        assert_eq!(out.finish_reason, FinishReason::Stop);
        assert!(out.turn_complete);
    }

    #[test]
    fn test_payload_errors() {
        assert_eq!(
            response_to_canonical::<&str>(None, &[]).unwrap_err().to_string(),
            "Invalid payload: nil openai response"
        );
        assert_eq!(
            response_to_canonical::<&str>(Some(&completed(vec![])), &[])
                .unwrap_err()
                .to_string(),
            "Invalid payload: empty output"
        );
        let unconvertible = completed(vec![OutputItem::Unknown, message("")]);
        assert_eq!(
            response_to_canonical::<&str>(Some(&unconvertible), &[])
                .unwrap_err()
                .to_string(),
            "Invalid payload: no convertible output items"
        );
    }

    #[test]
    fn test_finish_reasons() {
        let details = |reason: &str| IncompleteDetails {
            reason: reason.to_string(),
        };
        assert_eq!(finish_reason(ResponseStatus::Completed, None), FinishReason::Stop);
        assert_eq!(
            finish_reason(ResponseStatus::Incomplete, Some(&details("MAX_OUTPUT_TOKENS"))),
            FinishReason::MaxTokens
        );
        assert_eq!(
            finish_reason(ResponseStatus::Incomplete, Some(&details("content_filter"))),
            FinishReason::Safety
        );
        assert_eq!(finish_reason(ResponseStatus::Incomplete, None), FinishReason::Other);
        assert_eq!(finish_reason(ResponseStatus::Failed, None), FinishReason::Other);
        assert_eq!(finish_reason(ResponseStatus::InProgress, None), FinishReason::Unspecified);
    }
}
