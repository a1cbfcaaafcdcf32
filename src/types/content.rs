use serde::{Deserialize, Serialize};

/// A JSON object, used for function arguments and function results.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Role of a conversation turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Model,
    System,
    Developer,
}

impl Role {
    /// Parse a role name, ignoring case and surrounding whitespace.
    pub fn parse(name: &str) -> Option<Role> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "user" => Some(Role::User),
            "model" | "assistant" => Some(Role::Model),
            "system" => Some(Role::System),
            "developer" => Some(Role::Developer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
            Role::System => "system",
            Role::Developer => "developer",
        }
    }
}

/// A model-emitted request to invoke a named function.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub args: JsonObject,
}

/// The result of a function call, sent back to the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub response: JsonObject,
}

/// Inline binary payload. No provider mapper accepts it yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Reference to an uploaded file. Only xAI accepts it, by file id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

/// One addressable unit inside a content turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Part {
    Text(String),
    /// Reasoning trace, kept apart from user-visible text.
    Thought(String),
    FunctionCall(FunctionCall),
    FunctionResponse(FunctionResponse),
    InlineData(Blob),
    FileData(FileData),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text(text.into())
    }

    pub fn thought(text: impl Into<String>) -> Self {
        Part::Thought(text.into())
    }

    pub fn function_call(id: Option<String>, name: impl Into<String>, args: JsonObject) -> Self {
        Part::FunctionCall(FunctionCall {
            id,
            name: name.into(),
            args,
        })
    }

    pub fn function_response(
        id: Option<String>,
        name: impl Into<String>,
        response: JsonObject,
    ) -> Self {
        Part::FunctionResponse(FunctionResponse {
            id,
            name: name.into(),
            response,
        })
    }

    /// Text carried by a text or thought part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text(text) | Part::Thought(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_function_call(&self) -> Option<&FunctionCall> {
        match self {
            Part::FunctionCall(call) => Some(call),
            _ => None,
        }
    }

    /// True for a text or thought part with nothing in it.
    pub fn is_empty(&self) -> bool {
        matches!(self, Part::Text(text) | Part::Thought(text) if text.is_empty())
    }
}

/// A conversation turn: a role and its ordered parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn new(role: Role, parts: Vec<Part>) -> Self {
        Self { role, parts }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![Part::text(text)])
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, vec![Part::text(text)])
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, vec![Part::text(text)])
    }

    /// Concatenate the text parts, skipping thoughts and everything else.
    pub fn joined_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}
