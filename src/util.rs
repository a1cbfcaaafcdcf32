use crate::types::Content;

/// Identifier used for a function call or response at `(content, part)`.
///
/// A caller-supplied id wins; otherwise a stable `tool_<content>_<part>` id is
/// synthesized so calls and their results still pair up.
pub fn tool_id(id: Option<&str>, content_idx: usize, part_idx: usize) -> String {
    match id {
        Some(id) if !id.trim().is_empty() => id.to_string(),
        _ => format!("tool_{content_idx}_{part_idx}"),
    }
}

/// Concatenate the text parts of an optional system content.
pub(crate) fn system_text(system: Option<&Content>) -> String {
    system.map(Content::joined_text).unwrap_or_default()
}
