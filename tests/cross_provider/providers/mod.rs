pub mod anthropic;
pub mod openai;
pub mod xai;

use bytes::Bytes;
use futures_util::stream;
use llm_bridge::{
    json_events, Error, FunctionDeclaration, GenerationConfig, JsonObject, Provider, Response,
    ResponseStream, SseStreamExt, StreamAggregator, Tool,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

pub const SYSTEM_PROMPT: &str =
    "You have access to weather data. Use the get_weather function when asked about weather.";
pub const USER_PROMPT: &str = "What's the weather like in Paris?";
pub const WEATHER_REPORT: &str = "Sunny, 22°C";

pub fn weather_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "location": {
                "type": "string",
                "description": "The city and state, e.g. San Francisco, CA"
            }
        },
        "required": ["location"]
    })
}

/// Generation config offering the weather function.
pub fn weather_config() -> GenerationConfig {
    GenerationConfig {
        temperature: Some(0.5),
        max_output_tokens: Some(150),
        tools: vec![Tool::functions(vec![FunctionDeclaration::new(
            "get_weather",
            "Get the current weather for a location",
        )
        .with_json_schema(weather_schema())])],
        ..Default::default()
    }
}

/// The function result sent back on the follow-up turn.
pub fn weather_result() -> JsonObject {
    let mut result = JsonObject::new();
    result.insert("report".to_string(), Value::from(WEATHER_REPORT));
    result
}

/// Load test fixture from file
pub fn load_fixture(name: &str) -> String {
    let path = format!("{}/tests/cross_provider/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to load test fixture: {path}"))
}

/// Replay an SSE body through `aggregator`, delivered in small chunks so
/// events straddle chunk boundaries.
pub async fn replay_sse<A>(body: &str, aggregator: A) -> Result<Response, Error>
where
    A: StreamAggregator + Unpin,
    A::Event: DeserializeOwned,
{
    let chunks: Vec<Result<Bytes, std::io::Error>> = body
        .as_bytes()
        .chunks(7)
        .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
        .collect();
    let events = Box::pin(json_events::<_, A::Event>(stream::iter(chunks).sse_events()));
    ResponseStream::new(events, aggregator).buffer().await
}

/// Which turn of the conversation a fixture answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// The user question; the model answers with a function call.
    Initial,
    /// The function result; the model answers in text.
    Followup,
}

/// Provider configuration for cross-provider testing
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub name: &'static str,
    pub model: &'static str,
    /// Id of the function call in the initial fixture.
    pub call_id: &'static str,
}

/// Trait for provider-specific test setup
#[allow(async_fn_in_trait)]
pub trait ProviderTestSetup {
    type Provider: Provider;

    fn config() -> TestConfig;

    fn create_provider() -> Self::Provider;

    /// The native request the provider must build for `turn`.
    fn expected_request(turn: Turn) -> Value;

    /// Feed the canned reply to `turn` through the provider.
    async fn respond(
        provider: &Self::Provider,
        req: &llm_bridge::Request,
        turn: Turn,
    ) -> Result<Response, Error>;
}
