use super::{
    load_fixture, replay_sse, weather_schema, ProviderTestSetup, TestConfig, Turn, SYSTEM_PROMPT,
    USER_PROMPT,
};
use llm_bridge::{
    Error, OpenAIProvider, ProviderConfig, ProviderKind, Request, Response, StreamingProvider,
};
use serde_json::{json, Value};

pub struct OpenAITestSetup;

impl ProviderTestSetup for OpenAITestSetup {
    type Provider = OpenAIProvider;

    fn config() -> TestConfig {
        TestConfig {
            name: "OpenAI",
            model: "gpt-5",
            call_id: "call_abc123def456",
        }
    }

    fn create_provider() -> OpenAIProvider {
        OpenAIProvider::new(ProviderConfig::new(ProviderKind::OpenAI, Self::config().model))
    }

    fn expected_request(turn: Turn) -> Value {
        let mut input = vec![json!({"type": "message", "role": "user", "content": USER_PROMPT})];
        if turn == Turn::Followup {
            input.push(json!({
                "type": "message",
                "role": "assistant",
                "content": "I'll check the weather in Paris."
            }));
            input.push(json!({
                "type": "function_call",
                "call_id": "call_abc123def456",
                "name": "get_weather",
                "arguments": r#"{"location":"Paris"}"#
            }));
            input.push(json!({
                "type": "function_call_output",
                "call_id": "call_abc123def456",
                "output": r#"{"report":"Sunny, 22°C"}"#
            }));
        }

        json!({
            "model": "gpt-5",
            "input": input,
            "instructions": SYSTEM_PROMPT,
            "temperature": 0.5,
            "max_output_tokens": 150,
            "tools": [{
                "type": "function",
                "name": "get_weather",
                "description": "Get the current weather for a location",
                "parameters": weather_schema(),
                "strict": true
            }]
        })
    }

    async fn respond(
        provider: &OpenAIProvider,
        req: &Request,
        turn: Turn,
    ) -> Result<Response, Error> {
        let fixture = match turn {
            Turn::Initial => "openai/function_call_response.sse",
            Turn::Followup => "openai/followup_response.sse",
        };
        replay_sse(&load_fixture(fixture), provider.aggregator(req)).await
    }
}
