use crate::aggregator::StreamAggregator;
use crate::factory::ProviderKind;
use crate::{Error, Request, Response};

/// A translator between canonical requests/responses and one backend's
/// native schema. Transport is left to the caller.
pub trait Provider {
    /// The backend's native request type.
    type Request;
    /// The backend's native non-streaming response type.
    type Response;

    fn kind(&self) -> ProviderKind;

    /// Normalize `req` and project it into a native request.
    fn build_request(&self, req: &mut Request) -> Result<Self::Request, Error>;

    /// Convert a native response back into canonical form.
    fn parse_response(&self, response: &Self::Response, req: &Request) -> Result<Response, Error>;
}

/// A provider whose streamed output is reassembled by an aggregator.
pub trait StreamingProvider: Provider {
    type Aggregator: StreamAggregator;

    /// A fresh aggregator for one stream of `req`.
    fn aggregator(&self, req: &Request) -> Self::Aggregator;
}
