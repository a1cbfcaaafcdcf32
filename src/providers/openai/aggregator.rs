//! Aggregation of Responses API stream events into canonical responses.

use super::convert::{finish_reason, response_to_canonical, usage_metadata};
use super::types::{event_type, ResponseStatus, ResponseStreamEvent, ResponseUsage};
use crate::aggregator::StreamAggregator;
use crate::args::parse_args;
use crate::stop::trim_at_stop;
use crate::types::{FinishReason, Part, Response};
use crate::Error;
use std::collections::HashMap;

/// Table size at which tool-call lookups switch from a linear scan to maps.
const TOOL_CALL_LOOKUP_THRESHOLD: usize = 32;

#[derive(Debug, Default)]
struct ToolCallState {
    id: String,
    name: String,
    index: i64,
    args: String,
}

/// Map lookups over the tool-call table. Every entry is indexed by its
/// output index, and by its item id once it has one.
#[derive(Debug, Default)]
struct ToolCallLookup {
    by_id: HashMap<String, usize>,
    by_index: HashMap<i64, usize>,
}

impl ToolCallLookup {
    fn insert_id(&mut self, id: &str, slot: usize) {
        if id.is_empty() {
            return;
        }
        let entry = self.by_id.entry(id.to_string()).or_insert(slot);
        *entry = (*entry).min(slot);
    }
}

/// Builds canonical responses from a Responses API event stream.
///
/// Text deltas are surfaced as partial responses as they arrive. Tool-call
/// arguments are buffered and only appear in [`final_response`](Self::final_response).
#[derive(Debug, Default)]
pub struct ResponsesAggregator {
    text: String,
    tool_calls: Vec<ToolCallState>,
    lookup: Option<ToolCallLookup>,
    usage: Option<ResponseUsage>,
    status: Option<ResponseStatus>,
    terminal: Option<Response>,
    err: Option<Error>,
    stop_sequences: Vec<String>,
}

impl ResponsesAggregator {
    pub fn new(stop_sequences: Vec<String>) -> Self {
        Self {
            stop_sequences,
            ..Default::default()
        }
    }

    /// Consume one event, returning any partial responses it produced.
    pub fn process(&mut self, event: &ResponseStreamEvent) -> Vec<Response> {
        match event.kind.as_str() {
            event_type::OUTPUT_TEXT_DELTA => {
                if event.delta.is_empty() {
                    return Vec::new();
                }
                self.text.push_str(&event.delta);

                let mut partial = Response::from_parts(vec![Part::text(event.delta.clone())]);
                partial.partial = true;
                return vec![partial];
            }
            event_type::FUNCTION_CALL_ARGUMENTS_DELTA => {
                let slot = self.ensure_tool_call(event.output_index, &event.item_id);
                self.tool_calls[slot].args.push_str(&event.delta);
            }
            event_type::FUNCTION_CALL_ARGUMENTS_DONE => {
                let slot = self.ensure_tool_call(event.output_index, &event.item_id);
                let state = &mut self.tool_calls[slot];
                if !event.name.is_empty() {
                    state.name = event.name.clone();
                }
                if !event.arguments.is_empty() {
                    state.args = event.arguments.clone();
                }
                if !event.item_id.is_empty() {
                    self.reindex(slot, &event.item_id);
                }
            }
            event_type::COMPLETED => self.capture_terminal(ResponseStatus::Completed, event),
            event_type::INCOMPLETE => self.capture_terminal(ResponseStatus::Incomplete, event),
            event_type::FAILED | event_type::ERROR => {
                self.err = Some(Error::stream(failure_message(event)));
            }
            other => {
                tracing::trace!(event_type = other, "ignoring openai stream event");
            }
        }

        Vec::new()
    }

    fn capture_terminal(&mut self, status: ResponseStatus, event: &ResponseStreamEvent) {
        self.status = Some(status);
        let Some(response) = event.response.as_ref() else {
            return;
        };
        self.usage = response.usage.clone();

        match response_to_canonical(Some(response), &self.stop_sequences) {
            Ok(terminal) => self.terminal = Some(terminal),
            Err(err) => {
                // The accumulated deltas still produce a response.
                tracing::warn!(error = %err, "failed to convert terminal openai response");
            }
        }
    }

    /// The terminal response.
    ///
    /// A converted `response.completed`/`response.incomplete` payload wins.
    /// After a failure this is `None`. Otherwise the response is rebuilt from
    /// the accumulated deltas, or `None` if nothing was seen at all.
    pub fn final_response(&self) -> Option<Response> {
        if let Some(terminal) = &self.terminal {
            return Some(terminal.clone());
        }
        if self.err.is_some() {
            return None;
        }
        if self.text.is_empty() && self.tool_calls.is_empty() && self.status.is_none() {
            return None;
        }

        let mut parts = Vec::with_capacity(self.tool_calls.len() + 1);
        let (text, hit) = trim_at_stop(&self.text, &self.stop_sequences);
        if !text.is_empty() {
            parts.push(Part::text(text));
        }

        let mut calls: Vec<&ToolCallState> = self.tool_calls.iter().collect();
        calls.sort_by_key(|tc| tc.index);
        for tc in calls {
            parts.push(Part::function_call(
                Some(tc.id.clone()).filter(|id| !id.is_empty()),
                tc.name.clone(),
                parse_args(&tc.args),
            ));
        }

        let status = self.status.unwrap_or_default();
        let mut response = Response::from_parts(parts);
        response.usage_metadata = self.usage.as_ref().map(usage_metadata);
        response.finish_reason = if hit {
            FinishReason::Stop
        } else {
            finish_reason(status, None)
        };
        response.turn_complete = status.is_terminal_turn();
        Some(response)
    }

    pub fn err(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    fn ensure_tool_call(&mut self, index: i64, id: &str) -> usize {
        if let Some(slot) = self.find_tool_call(index, id) {
            return slot;
        }

        let slot = self.push_tool_call(index, id);
        match self.lookup.as_mut() {
            Some(lookup) => {
                lookup.by_index.insert(index, slot);
                lookup.insert_id(id, slot);
            }
            None => self.maybe_init_lookup(),
        }
        slot
    }

    /// The first entry matching either the output index or the item id.
    fn find_tool_call(&self, index: i64, id: &str) -> Option<usize> {
        let Some(lookup) = self.lookup.as_ref() else {
            return self
                .tool_calls
                .iter()
                .position(|tc| tc.index == index || (!id.is_empty() && tc.id == id));
        };

        let by_id = if id.is_empty() {
            None
        } else {
            lookup.by_id.get(id).copied()
        };
        let by_index = lookup.by_index.get(&index).copied();
        by_id.into_iter().chain(by_index).min()
    }

    /// Move an entry under a newly learned item id.
    fn reindex(&mut self, slot: usize, id: &str) {
        let state = &mut self.tool_calls[slot];
        if let Some(lookup) = self.lookup.as_mut() {
            if state.id != id && lookup.by_id.get(&state.id) == Some(&slot) {
                lookup.by_id.remove(&state.id);
            }
            lookup.insert_id(id, slot);
        }
        state.id = id.to_string();
    }

    fn push_tool_call(&mut self, index: i64, id: &str) -> usize {
        self.tool_calls.push(ToolCallState {
            id: id.to_string(),
            index,
            ..Default::default()
        });
        self.tool_calls.len() - 1
    }

    fn maybe_init_lookup(&mut self) {
        if self.lookup.is_some() || self.tool_calls.len() < TOOL_CALL_LOOKUP_THRESHOLD {
            return;
        }

        let mut lookup = ToolCallLookup {
            by_id: HashMap::with_capacity(self.tool_calls.len()),
            by_index: HashMap::with_capacity(self.tool_calls.len()),
        };
        for (slot, tc) in self.tool_calls.iter().enumerate() {
            lookup.by_index.entry(tc.index).or_insert(slot);
            lookup.insert_id(&tc.id, slot);
        }

        tracing::debug!(tool_calls = self.tool_calls.len(), "promoting tool call lookup to maps");
        self.lookup = Some(lookup);
    }
}

/// Message of a failed stream: the event's own, then the response error's.
fn failure_message(event: &ResponseStreamEvent) -> &str {
    [
        event.message.trim(),
        event
            .response
            .as_ref()
            .and_then(|r| r.error.as_ref())
            .map(|e| e.message.trim())
            .unwrap_or_default(),
    ]
    .into_iter()
    .find(|m| !m.is_empty())
    .unwrap_or("openai response failed")
}

impl StreamAggregator for ResponsesAggregator {
    type Event = ResponseStreamEvent;

    fn process(&mut self, event: &ResponseStreamEvent) -> Result<Vec<Response>, Error> {
        Ok(ResponsesAggregator::process(self, event))
    }

    fn finish(&mut self) -> Option<Response> {
        self.final_response()
    }

    fn error(&self) -> Option<&Error> {
        self.err()
    }
}
