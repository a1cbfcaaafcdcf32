use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Chat message role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    #[default]
    #[serde(rename = "INVALID_ROLE")]
    Invalid,
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_ASSISTANT")]
    Assistant,
    #[serde(rename = "ROLE_SYSTEM")]
    System,
    #[serde(rename = "ROLE_TOOL")]
    Tool,
}

impl MessageRole {
    /// Wire name of the role.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            MessageRole::Invalid => "INVALID_ROLE",
            MessageRole::User => "ROLE_USER",
            MessageRole::Assistant => "ROLE_ASSISTANT",
            MessageRole::System => "ROLE_SYSTEM",
            MessageRole::Tool => "ROLE_TOOL",
        }
    }
}

/// One piece of message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Content {
    Text(String),
    File(FileContent),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileContent {
    pub file_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Content>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<FunctionCall>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments; empty when the call takes none.
    #[serde(default)]
    pub arguments: String,
}

/// Tool made available to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    Function(FunctionTool),
    CodeExecution(CodeExecution),
    WebSearch(WebSearch),
    CollectionsSearch(CollectionsSearch),
    Mcp(Mcp),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionTool {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// JSON-encoded parameter schema.
    #[serde(default)]
    pub parameters: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeExecution {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebSearch {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_domains: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_domains: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_image_understanding: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionsSearch {
    pub collection_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mcp {
    pub server_url: String,
    pub server_label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server_description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_tool_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolMode {
    #[default]
    #[serde(rename = "TOOL_MODE_INVALID")]
    Invalid,
    #[serde(rename = "TOOL_MODE_AUTO")]
    Auto,
    #[serde(rename = "TOOL_MODE_NONE")]
    None,
    #[serde(rename = "TOOL_MODE_REQUIRED")]
    Required,
}

/// Either a calling mode or a single function the model must call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    Mode(ToolMode),
    FunctionName(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatType {
    #[default]
    #[serde(rename = "FORMAT_TYPE_INVALID")]
    Invalid,
    #[serde(rename = "FORMAT_TYPE_TEXT")]
    Text,
    #[serde(rename = "FORMAT_TYPE_JSON_OBJECT")]
    JsonObject,
    #[serde(rename = "FORMAT_TYPE_JSON_SCHEMA")]
    JsonSchema,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseFormat {
    pub format_type: FormatType,
    /// JSON-encoded schema for [`FormatType::JsonSchema`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

/// xAI chat completion request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetCompletionsRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default)]
    pub logprobs: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_logprobs: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// xAI chat completion response.
///
/// When streaming, each snapshot carries the output accumulated so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetChatCompletionResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub outputs: Vec<CompletionOutput>,
    #[serde(default)]
    pub usage: Option<SamplingUsage>,
    #[serde(default)]
    pub system_fingerprint: String,
    #[serde(default)]
    pub citations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionOutput {
    /// Raw reason name, e.g. `REASON_STOP`.
    #[serde(default)]
    pub finish_reason: String,
    #[serde(default)]
    pub index: i32,
    #[serde(default)]
    pub message: Option<CompletionMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionMessage {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub reasoning_content: String,
    #[serde(default)]
    pub role: MessageRole,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default)]
    pub encrypted_content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingUsage {
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
    #[serde(default)]
    pub reasoning_tokens: u32,
    #[serde(default)]
    pub cached_prompt_text_tokens: u32,
}

impl GetChatCompletionResponse {
    /// The last assistant output.
    pub fn output(&self) -> Option<&CompletionOutput> {
        self.outputs.iter().rev().find(|out| {
            out.message
                .as_ref()
                .is_some_and(|m| m.role == MessageRole::Assistant)
        })
    }

    fn message(&self) -> Option<&CompletionMessage> {
        self.output().and_then(|out| out.message.as_ref())
    }

    pub fn content(&self) -> &str {
        self.message().map(|m| m.content.as_str()).unwrap_or_default()
    }

    pub fn reasoning_content(&self) -> &str {
        self.message()
            .map(|m| m.reasoning_content.as_str())
            .unwrap_or_default()
    }

    /// Wire name of the output role, empty when there is no assistant output.
    pub fn role(&self) -> &'static str {
        self.message().map(|m| m.role.as_str_name()).unwrap_or_default()
    }

    pub fn finish_reason(&self) -> &str {
        self.output()
            .map(|out| out.finish_reason.as_str())
            .unwrap_or_default()
    }

    /// Tool calls across every assistant output, in output order.
    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCall> {
        self.outputs
            .iter()
            .filter_map(|out| out.message.as_ref())
            .filter(|m| m.role == MessageRole::Assistant)
            .flat_map(|m| m.tool_calls.iter())
    }
}
