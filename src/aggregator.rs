//! Shared contract of the streaming aggregators.

use crate::{Error, Response};

/// Reassembles a streamed response from incremental provider events.
///
/// An aggregator is owned by a single consumer and fed events in arrival
/// order. It never suspends; all waiting happens in the transport.
pub trait StreamAggregator {
    /// One streamed provider event.
    type Event;

    /// Ingest an event and return the responses it produces, in order.
    ///
    /// Stream failures reported by the provider are not returned here; they
    /// are captured and exposed through [`StreamAggregator::error`].
    fn process(&mut self, event: &Self::Event) -> Result<Vec<Response>, Error>;

    /// The terminal response, built from accumulated state when the stream
    /// ended without a terminal event. `None` when there is nothing to report.
    fn finish(&mut self) -> Option<Response>;

    /// The failure captured from the stream, if any.
    fn error(&self) -> Option<&Error>;
}
