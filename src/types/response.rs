use crate::types::{Content, FunctionCall, Part, Role};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Why generation finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Other,
    #[default]
    Unspecified,
}

/// Token usage information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetadata {
    pub prompt_token_count: u32,
    pub candidates_token_count: u32,
    pub total_token_count: u32,
    pub cached_content_token_count: Option<u32>,
    pub thoughts_token_count: Option<u32>,
}

/// A provider-neutral response, either complete or a streaming partial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub content: Option<Content>,
    pub usage_metadata: Option<UsageMetadata>,
    pub finish_reason: FinishReason,
    pub turn_complete: bool,
    /// Set on mid-stream responses that carry only a delta.
    pub partial: bool,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    /// Provider extras with no canonical slot.
    pub custom_metadata: Option<BTreeMap<String, Value>>,
}

impl Response {
    /// A model turn with the given parts.
    pub fn from_parts(parts: Vec<Part>) -> Self {
        Self {
            content: Some(Content::new(Role::Model, parts)),
            ..Default::default()
        }
    }

    pub fn parts(&self) -> &[Part] {
        self.content
            .as_ref()
            .map(|content| content.parts.as_slice())
            .unwrap_or_default()
    }

    pub fn role(&self) -> Option<Role> {
        self.content.as_ref().map(|content| content.role)
    }

    /// Visible text concatenated in order.
    pub fn text(&self) -> String {
        self.content
            .as_ref()
            .map(Content::joined_text)
            .unwrap_or_default()
    }

    /// Function calls in order.
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.parts()
            .iter()
            .filter_map(Part::as_function_call)
            .collect()
    }

    pub fn custom_metadata(&self, key: &str) -> Option<&Value> {
        self.custom_metadata.as_ref().and_then(|meta| meta.get(key))
    }
}
