//! Provider-neutral LLM requests and responses.
//!
//! This library translates one canonical conversation model to and from the
//! native schemas of Anthropic Messages, OpenAI Responses and xAI chat
//! completions, and reassembles their streamed output into canonical
//! responses. Sending requests is left to the caller.

pub mod aggregator;
pub mod args;
pub mod error;
pub mod factory;
pub mod normalize;
pub mod params;
pub mod provider;
pub mod providers;
pub mod response;
pub mod sse_stream;
pub mod stop;
pub mod types;
mod util;

// Re-export core types for easy usage
pub use aggregator::StreamAggregator;
pub use error::Error;
pub use factory::{AnyProvider, ProviderConfig, ProviderFactory, ProviderKind};
pub use params::ProviderParams;
pub use provider::{Provider, StreamingProvider};
pub use providers::{AnthropicProvider, OpenAIProvider, XaiProvider};
pub use response::ResponseStream;
pub use sse_stream::{json_events, SseEvent, SseStreamExt};
pub use types::*;
pub use util::tool_id;
