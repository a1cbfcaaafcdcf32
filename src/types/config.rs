use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Generation options shared by every provider.
///
/// Every scalar is optional: `None` leaves the provider default in place,
/// which is not the same as sending zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub seed: Option<i32>,
    #[serde(default)]
    pub stop_sequences: Vec<String>,
    pub frequency_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
    /// Ask for token log probabilities.
    #[serde(default)]
    pub response_logprobs: bool,
    /// Number of top candidates per token; implies `response_logprobs`.
    pub logprobs: Option<i32>,
    pub response_json_schema: Option<Value>,
    pub response_schema: Option<Value>,
    pub response_mime_type: Option<String>,
    #[serde(default)]
    pub tools: Vec<Tool>,
    pub tool_config: Option<ToolConfig>,
    pub http_options: Option<HttpOptions>,
}

impl GenerationConfig {
    /// True when the caller asked for JSON output by mime type.
    pub fn wants_json_object(&self) -> bool {
        self.response_mime_type
            .as_deref()
            .map(|mime| mime.trim().to_ascii_lowercase().starts_with("application/json"))
            .unwrap_or(false)
    }

    /// The structured-output schema, preferring the JSON-schema form.
    pub fn response_schema_value(&self) -> Option<&Value> {
        self.response_json_schema
            .as_ref()
            .or(self.response_schema.as_ref())
    }

    pub fn function_calling_mode(&self) -> Option<FunctionCallingMode> {
        self.tool_config.as_ref().and_then(|tc| tc.mode)
    }

    pub fn allowed_function_names(&self) -> &[String] {
        self.tool_config
            .as_ref()
            .map(|tc| tc.allowed_function_names.as_slice())
            .unwrap_or_default()
    }
}

/// Request-scoped HTTP options passed through to the transport untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpOptions {
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// How the model may call functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionCallingMode {
    None,
    Any,
    Auto,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    pub mode: Option<FunctionCallingMode>,
    #[serde(default)]
    pub allowed_function_names: Vec<String>,
}

impl ToolConfig {
    pub fn mode(mode: FunctionCallingMode) -> Self {
        Self {
            mode: Some(mode),
            allowed_function_names: Vec::new(),
        }
    }

    /// Force a call to exactly one function.
    pub fn force(name: impl Into<String>) -> Self {
        Self {
            mode: Some(FunctionCallingMode::Any),
            allowed_function_names: vec![name.into()],
        }
    }
}

/// A tool made available to the model: function declarations and/or
/// built-in provider tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    #[serde(default)]
    pub function_declarations: Vec<FunctionDeclaration>,
    pub code_execution: Option<CodeExecution>,
    pub web_search: Option<WebSearch>,
    pub collections_search: Option<CollectionsSearch>,
    pub mcp: Option<McpServer>,
}

impl Tool {
    pub fn functions(declarations: Vec<FunctionDeclaration>) -> Self {
        Self {
            function_declarations: declarations,
            ..Default::default()
        }
    }
}

/// A function the model may call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Parameter schema in the provider-neutral schema form.
    pub parameters: Option<Value>,
    /// Parameter schema as plain JSON Schema. Preferred when both are set.
    pub parameters_json_schema: Option<Value>,
}

impl FunctionDeclaration {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_json_schema(mut self, schema: Value) -> Self {
        self.parameters_json_schema = Some(schema);
        self
    }

    pub fn with_parameters(mut self, schema: Value) -> Self {
        self.parameters = Some(schema);
        self
    }

    /// The parameter schema to send, preferring the JSON-schema form.
    pub fn schema(&self) -> Option<&Value> {
        self.parameters_json_schema
            .as_ref()
            .or(self.parameters.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeExecution {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebSearch {
    #[serde(default)]
    pub allowed_domains: Vec<String>,
    #[serde(default)]
    pub excluded_domains: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionsSearch {
    pub collection_ids: Vec<String>,
    pub limit: Option<u32>,
}

/// A remote MCP server exposed to the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct McpServer {
    pub server_url: String,
    pub server_label: String,
    #[serde(default)]
    pub server_description: String,
    #[serde(default)]
    pub allowed_tool_names: Vec<String>,
    pub authorization: Option<String>,
    #[serde(default)]
    pub extra_headers: BTreeMap<String, String>,
}
