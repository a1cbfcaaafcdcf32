//! Aggregation of streamed xAI completion snapshots.

use super::convert::completion_to_canonical;
use super::types::GetChatCompletionResponse;
use crate::aggregator::StreamAggregator;
use crate::types::{Content, FinishReason, Part, Response, Role};
use crate::Error;

/// Merges streamed xAI responses into one text response.
///
/// Snapshots may carry either per-chunk deltas or the cumulative text so far.
/// Only the unseen suffix is buffered, so both forms produce the same result.
#[derive(Debug, Default)]
pub struct XaiAggregator {
    text: String,
    thought: String,
    role: Option<Role>,
    /// Metadata of the last response seen, without its content.
    last: Option<Response>,
    /// Function calls of the last snapshot that was folded into the buffers.
    pending_calls: Vec<Part>,
}

/// Append the part of `incoming` not already in `acc` and return it.
fn append_delta(acc: &mut String, incoming: &str) -> String {
    let delta = incoming.strip_prefix(acc.as_str()).unwrap_or(incoming);
    acc.push_str(delta);
    delta.to_string()
}

impl XaiAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one snapshot.
    ///
    /// Returns a merged response first when the snapshot ends a run of text,
    /// followed by the translated snapshot itself.
    pub fn process(&mut self, resp: &GetChatCompletionResponse) -> Result<Vec<Response>, Error> {
        if resp.content().is_empty()
            && resp.reasoning_content().is_empty()
            && resp.tool_calls().next().is_none()
        {
            return Err(Error::payload("empty response"));
        }

        let mut response = completion_to_canonical(Some(resp));
        response.turn_complete = response.finish_reason != FinishReason::Unspecified;

        let mut out = Vec::with_capacity(2);
        out.extend(self.aggregate(&mut response));
        out.push(response);
        Ok(out)
    }

    fn aggregate(&mut self, response: &mut Response) -> Option<Response> {
        self.last = Some(Response {
            content: None,
            custom_metadata: None,
            ..response.clone()
        });

        let parts = response.parts();
        if !parts.is_empty() {
            self.role = response.role();
        }

        let leading = parts
            .iter()
            .take_while(|p| matches!(p, Part::Text(t) | Part::Thought(t) if !t.is_empty()))
            .count();
        if leading > 0 {
            let deltas: Vec<Part> = parts[..leading]
                .iter()
                .filter_map(|part| match part {
                    Part::Thought(t) => Some(Part::Thought(append_delta(&mut self.thought, t))),
                    Part::Text(t) => Some(Part::Text(append_delta(&mut self.text, t))),
                    _ => None,
                })
                .filter(|part| !part.is_empty())
                .collect();
            self.pending_calls = parts[leading..]
                .iter()
                .filter(|p| matches!(p, Part::FunctionCall(_)))
                .cloned()
                .collect();

            // Partials carry only what the buffers had not seen yet.
            if let Some(content) = response.content.as_mut() {
                content.parts.splice(..leading, deltas);
            }
            response.partial = true;
            return None;
        }

        if parts.first().is_some_and(Part::is_empty) {
            response.partial = true;
            return None;
        }

        if !self.is_buffer_empty() && !matches!(parts.first(), Some(Part::InlineData(_))) {
            // This response carries its own function calls.
            self.pending_calls.clear();
            return self.close();
        }

        None
    }

    fn is_buffer_empty(&self) -> bool {
        self.text.is_empty() && self.thought.is_empty()
    }

    /// Flush the buffered text as one response and reset.
    ///
    /// The merged response holds the reasoning, then the text, then the
    /// function calls of the last folded snapshot. It carries usage, errors
    /// and the finish reason of the last response seen. `None` when no text
    /// was buffered.
    pub fn close(&mut self) -> Option<Response> {
        let merged = match self.last.take() {
            Some(last) if !self.is_buffer_empty() => {
                let mut parts = Vec::with_capacity(2 + self.pending_calls.len());
                if !self.thought.is_empty() {
                    parts.push(Part::Thought(std::mem::take(&mut self.thought)));
                }
                if !self.text.is_empty() {
                    parts.push(Part::Text(std::mem::take(&mut self.text)));
                }
                parts.append(&mut self.pending_calls);

                let role = self.role.unwrap_or(Role::Model);
                Some(Response {
                    content: Some(Content::new(role, parts)),
                    partial: false,
                    ..last
                })
            }
            _ => None,
        };

        self.text.clear();
        self.thought.clear();
        self.pending_calls.clear();
        self.role = None;
        merged
    }
}

impl StreamAggregator for XaiAggregator {
    type Event = GetChatCompletionResponse;

    fn process(&mut self, event: &GetChatCompletionResponse) -> Result<Vec<Response>, Error> {
        XaiAggregator::process(self, event)
    }

    fn finish(&mut self) -> Option<Response> {
        self.close()
    }

    /// Always `None`: an unusable snapshot is returned by `process` instead.
    fn error(&self) -> Option<&Error> {
        None
    }
}
