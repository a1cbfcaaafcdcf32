//! Canonical response streams driven by a provider aggregator.

use crate::aggregator::StreamAggregator;
use crate::{Error, Response};
use futures_util::stream::Stream;
use futures_util::StreamExt;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

/// Canonical responses reassembled from a stream of provider events.
///
/// Yields every response the aggregator produces in order, then its terminal
/// response once the events run out. A transport error or a failure captured
/// by the aggregator is yielded as `Err` and ends the stream. An event the
/// aggregator rejects is yielded as `Err` without ending it.
pub struct ResponseStream<S, A> {
    events: S,
    aggregator: A,
    pending: VecDeque<Response>,
    failure: Option<Error>,
    done: bool,
}

/// Copy of a captured aggregator failure; the aggregator keeps the original.
fn replay(err: &Error) -> Error {
    match err {
        Error::Stream(message) => Error::Stream(message.clone()),
        other => Error::stream(other.to_string()),
    }
}

impl<S, A> ResponseStream<S, A>
where
    S: Stream<Item = Result<A::Event, Error>> + Unpin,
    A: StreamAggregator,
{
    pub fn new(events: S, aggregator: A) -> Self {
        Self {
            events,
            aggregator,
            pending: VecDeque::new(),
            failure: None,
            done: false,
        }
    }

    /// Drain the stream and return its terminal response.
    ///
    /// Rejected events are logged and skipped. When the aggregator has no
    /// terminal response of its own, the last complete response produced
    /// along the way is returned.
    pub async fn buffer(mut self) -> Result<Response, Error> {
        let mut last_complete = None;

        while let Some(event) = self.events.next().await {
            let event = event?;
            match self.aggregator.process(&event) {
                Ok(responses) => {
                    if let Some(complete) = responses.into_iter().rev().find(|r| !r.partial) {
                        last_complete = Some(complete);
                    }
                }
                Err(err) => tracing::warn!(error = %err, "skipping stream event"),
            }
            if let Some(err) = self.aggregator.error() {
                return Err(replay(err));
            }
        }

        self.aggregator
            .finish()
            .or(last_complete)
            .ok_or_else(|| Error::payload("empty stream"))
    }

    /// The terminal text of the stream.
    pub async fn text(self) -> Result<String, Error> {
        Ok(self.buffer().await?.text())
    }
}

impl<S, A> Stream for ResponseStream<S, A>
where
    S: Stream<Item = Result<A::Event, Error>> + Unpin,
    A: StreamAggregator + Unpin,
{
    type Item = Result<Response, Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(response) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(response)));
            }
            if let Some(err) = this.failure.take() {
                return Poll::Ready(Some(Err(err)));
            }
            if this.done {
                return Poll::Ready(None);
            }

            match ready!(this.events.poll_next_unpin(cx)) {
                Some(Ok(event)) => {
                    match this.aggregator.process(&event) {
                        Ok(responses) => this.pending.extend(responses),
                        Err(err) => return Poll::Ready(Some(Err(err))),
                    }
                    if let Some(err) = this.aggregator.error() {
                        tracing::debug!(error = %err, "aggregator captured stream failure");
                        this.failure = Some(replay(err));
                        this.done = true;
                    }
                }
                Some(Err(err)) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(err)));
                }
                None => {
                    this.done = true;
                    match this.aggregator.error() {
                        Some(err) => this.failure = Some(replay(err)),
                        None => this.pending.extend(this.aggregator.finish()),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::openai::types::event_type;
    use crate::providers::openai::{ResponseStreamEvent, ResponsesAggregator};
    use crate::providers::xai::types::{CompletionMessage, CompletionOutput, MessageRole};
    use crate::providers::xai::{GetChatCompletionResponse, XaiAggregator};
    use futures_util::stream;

    fn delta(text: &str) -> Result<ResponseStreamEvent, Error> {
        Ok(ResponseStreamEvent {
            kind: event_type::OUTPUT_TEXT_DELTA.to_string(),
            delta: text.to_string(),
            ..Default::default()
        })
    }

    fn snapshot(content: &str) -> Result<GetChatCompletionResponse, Error> {
        Ok(GetChatCompletionResponse {
            outputs: vec![CompletionOutput {
                message: Some(CompletionMessage {
                    role: MessageRole::Assistant,
                    content: content.to_string(),
                    ..Default::default()
                }),
                ..Default::default()
            }],
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_stream_yields_partials_then_final() {
        let events = stream::iter(vec![delta("Hel"), delta("lo")]);
        let responses: Vec<Response> =
            ResponseStream::new(events, ResponsesAggregator::new(Vec::new()))
                .map(|r| r.unwrap())
                .collect()
                .await;

        assert_eq!(responses.len(), 3);
        assert!(responses[0].partial && responses[1].partial);
        assert_eq!(responses[2].text(), "Hello");
        assert!(!responses[2].partial);
    }

    #[tokio::test]
    async fn test_failure_ends_stream() {
        let events = stream::iter(vec![
            delta("partial"),
            Ok(ResponseStreamEvent {
                kind: event_type::ERROR.to_string(),
                message: "rate limited".to_string(),
                ..Default::default()
            }),
            delta("ignored"),
        ]);
        let mut responses = ResponseStream::new(events, ResponsesAggregator::new(Vec::new()));

        assert!(responses.next().await.unwrap().unwrap().partial);
        let err = responses.next().await.unwrap().unwrap_err();
        assert_eq!(err.to_string(), "Streaming error: rate limited");
        assert!(responses.next().await.is_none());
    }

    #[tokio::test]
    async fn test_transport_error_ends_stream() {
        let events = stream::iter(vec![delta("Hi"), Err(Error::stream("connection reset"))]);
        let mut responses = ResponseStream::new(events, ResponsesAggregator::new(Vec::new()));

        assert!(responses.next().await.unwrap().is_ok());
        assert!(matches!(responses.next().await, Some(Err(Error::Stream(_)))));
        assert!(responses.next().await.is_none());
    }

    #[tokio::test]
    async fn test_buffer() {
        let events = stream::iter(vec![snapshot("He"), snapshot(""), snapshot("Hello")]);
        let response = ResponseStream::new(events, XaiAggregator::new())
            .buffer()
            .await
            .unwrap();
        assert_eq!(response.text(), "Hello");

        let events = stream::iter(Vec::<Result<ResponseStreamEvent, Error>>::new());
        let err = ResponseStream::new(events, ResponsesAggregator::new(Vec::new()))
            .buffer()
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid payload: empty stream");
    }

    #[tokio::test]
    async fn test_rejected_event_does_not_end_stream() {
        let events = stream::iter(vec![snapshot(""), snapshot("Hi")]);
        let mut responses = ResponseStream::new(events, XaiAggregator::new());

        assert!(matches!(responses.next().await, Some(Err(Error::Payload(_)))));
        assert!(responses.next().await.unwrap().unwrap().partial);
        assert_eq!(responses.next().await.unwrap().unwrap().text(), "Hi");
        assert!(responses.next().await.is_none());
    }
}
