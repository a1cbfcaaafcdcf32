//! Request normalization applied before any outbound mapping.

use crate::types::{Content, GenerationConfig, HttpOptions, Request, Role};

const DEFAULT_USER_PROMPT: &str = "Handle the requests as specified in the System Instruction.";
const CONTINUE_USER_PROMPT: &str =
    "Continue processing previous requests as instructed. Exit or provide a summary if no more outputs are needed.";

/// Make a request well-formed and return its generation config.
///
/// Guarantees a trailing user turn, a config with an HTTP options slot and
/// headers map, and a `User-Agent` header when `user_agent` is not blank.
/// Applying it twice has the same effect as applying it once.
pub fn normalize_request<'a>(req: &'a mut Request, user_agent: &str) -> &'a mut GenerationConfig {
    ensure_user_content(&mut req.contents);

    let config = req.config.get_or_insert_with(GenerationConfig::default);
    let http = config.http_options.get_or_insert_with(HttpOptions::default);

    let user_agent = user_agent.trim();
    if !user_agent.is_empty() {
        http.headers
            .insert("User-Agent".to_string(), user_agent.to_string());
    }

    config
}

/// Append a user turn when the conversation is empty or ends on another role.
pub fn ensure_user_content(contents: &mut Vec<Content>) {
    match contents.last() {
        None => contents.push(Content::user(DEFAULT_USER_PROMPT)),
        Some(last) if last.role != Role::User => contents.push(Content::user(CONTINUE_USER_PROMPT)),
        Some(_) => {}
    }
}

/// The request's model when set, otherwise `default`.
pub fn model_name<'a>(default: &'a str, req: &'a Request) -> &'a str {
    match req.model.trim() {
        "" => default,
        name => name,
    }
}
