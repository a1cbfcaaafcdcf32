//! Decoding of Server-Sent Events byte streams into provider events.

use crate::Error;
use futures_util::{future, Stream, StreamExt};
use memchr::memmem;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

/// Bytes of unterminated event data tolerated before the stream fails.
const MAX_BUFFER_BYTES: usize = 1_000_000;

/// A Server-Sent Events (SSE) event.
#[derive(Debug, Clone, PartialEq)]
pub struct SseEvent {
    pub event_type: Option<String>,
    /// Data lines joined with `\n`.
    pub data: String,
    pub id: Option<String>,
    /// Retry delay in milliseconds.
    pub retry: Option<u64>,
}

impl SseEvent {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            event_type: None,
            data: data.into(),
            id: None,
            retry: None,
        }
    }

    /// Whether this is the `[DONE]` sentinel ending a stream.
    pub fn is_done(&self) -> bool {
        self.data.trim() == "[DONE]"
    }
}

/// Parses SSE events from a byte stream, carrying partial events across chunks.
pub struct SseStream<S> {
    inner: S,
    buffer: Vec<u8>,
    events: VecDeque<SseEvent>,
}

impl<S> SseStream<S> {
    pub fn new(stream: S) -> Self {
        Self {
            inner: stream,
            buffer: Vec::new(),
            events: VecDeque::new(),
        }
    }

    /// Move every complete event out of the buffer.
    fn parse_buffer(&mut self) -> Result<(), Error> {
        let separator = b"\n\n";
        let finder = memmem::Finder::new(separator);
        let mut start = 0;

        while let Some(pos) = finder.find(&self.buffer[start..]) {
            let end = start + pos;
            let text = std::str::from_utf8(&self.buffer[start..end])
                .map_err(|e| Error::stream(format!("invalid UTF-8 in SSE event: {e}")))?;

            if let Some(event) = parse_event(text) {
                self.events.push_back(event);
            }
            start = end + separator.len();
        }

        if start > 0 {
            self.buffer.drain(..start);
        }
        Ok(())
    }
}

/// Parse one complete event. `None` when it carries no data lines.
fn parse_event(text: &str) -> Option<SseEvent> {
    let mut event_type = None;
    let mut data_lines = Vec::new();
    let mut id = None;
    let mut retry = None;

    for line in text.lines() {
        let line = line.trim_end();
        // Blank lines and comments.
        if line.is_empty() || line.starts_with(':') {
            continue;
        }

        if let Some((field, value)) = line.split_once(':') {
            let value = value.strip_prefix(' ').unwrap_or(value);
            match field {
                "event" => event_type = Some(value.to_string()),
                "data" => data_lines.push(value),
                "id" => id = Some(value.to_string()),
                "retry" => retry = value.parse().ok(),
                _ => {}
            }
        }
    }

    if data_lines.is_empty() {
        return None;
    }

    Some(SseEvent {
        event_type,
        data: data_lines.join("\n"),
        id,
        retry,
    })
}

impl<S, E> Stream for SseStream<S>
where
    S: Stream<Item = Result<bytes::Bytes, E>> + Unpin,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    type Item = Result<SseEvent, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(event) = self.events.pop_front() {
                return Poll::Ready(Some(Ok(event)));
            }

            let chunk = match ready!(self.inner.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    return Poll::Ready(Some(Err(Error::stream(format!(
                        "transport error: {}",
                        e.into()
                    )))));
                }
                None => {
                    // The last event may arrive without its trailing blank line.
                    let tail = std::mem::take(&mut self.buffer);
                    let event = std::str::from_utf8(&tail)
                        .ok()
                        .map(str::trim)
                        .filter(|text| !text.is_empty())
                        .and_then(parse_event);
                    return Poll::Ready(event.map(Ok));
                }
            };

            self.buffer.extend_from_slice(&chunk);
            if self.buffer.len() > MAX_BUFFER_BYTES {
                self.buffer.clear();
                return Poll::Ready(Some(Err(Error::stream(
                    "SSE buffer exceeded maximum size",
                ))));
            }

            if let Err(e) = self.parse_buffer() {
                return Poll::Ready(Some(Err(e)));
            }
        }
    }
}

/// Extension trait to add SSE parsing to byte streams.
pub trait SseStreamExt: Stream {
    fn sse_events(self) -> SseStream<Self>
    where
        Self: Sized,
    {
        SseStream::new(self)
    }
}

impl<S: Stream> SseStreamExt for S {}

/// Decode the data of each event as JSON.
///
/// The stream ends at the first `[DONE]` event. Events whose data does not
/// decode as `T` are skipped; transport and framing errors pass through.
pub fn json_events<S, T>(events: S) -> impl Stream<Item = Result<T, Error>>
where
    S: Stream<Item = Result<SseEvent, Error>>,
    T: DeserializeOwned,
{
    events
        .take_while(|event| future::ready(!matches!(event, Ok(event) if event.is_done())))
        .filter_map(|event| {
            future::ready(match event {
                Ok(event) => match serde_json::from_str::<T>(&event.data) {
                    Ok(decoded) => Some(Ok(decoded)),
                    Err(err) => {
                        tracing::debug!(
                            error = %err,
                            event_type = event.event_type.as_deref().unwrap_or(""),
                            "skipping undecodable SSE event"
                        );
                        None
                    }
                },
                Err(err) => Some(Err(err)),
            })
        })
}
