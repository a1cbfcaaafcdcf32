use super::{
    load_fixture, weather_schema, ProviderTestSetup, TestConfig, Turn, SYSTEM_PROMPT, USER_PROMPT,
};
use llm_bridge::providers::anthropic::MessageResponse;
use llm_bridge::{
    AnthropicProvider, Error, Provider, ProviderConfig, ProviderKind, Request, Response,
};
use serde_json::{json, Value};

pub struct AnthropicTestSetup;

impl ProviderTestSetup for AnthropicTestSetup {
    type Provider = AnthropicProvider;

    fn config() -> TestConfig {
        TestConfig {
            name: "Anthropic",
            model: "claude-sonnet-4-5",
            call_id: "toolu_123456",
        }
    }

    fn create_provider() -> AnthropicProvider {
        AnthropicProvider::new(ProviderConfig::new(ProviderKind::Anthropic, Self::config().model))
    }

    fn expected_request(turn: Turn) -> Value {
        let mut messages = vec![json!({
            "role": "user",
            "content": [{"type": "text", "text": USER_PROMPT}]
        })];
        if turn == Turn::Followup {
            messages.push(json!({
                "role": "assistant",
                "content": [
                    {"type": "text", "text": "I'll check the weather in Paris."},
                    {
                        "type": "tool_use",
                        "id": "toolu_123456",
                        "name": "get_weather",
                        "input": {"location": "Paris"}
                    }
                ]
            }));
            messages.push(json!({
                "role": "user",
                "content": [{
                    "type": "tool_result",
                    "tool_use_id": "toolu_123456",
                    "content": [{"type": "text", "text": r#"{"report":"Sunny, 22°C"}"#}]
                }]
            }));
        }

        let schema = weather_schema();
        json!({
            "model": "claude-sonnet-4-5",
            "max_tokens": 150,
            "system": [{"type": "text", "text": SYSTEM_PROMPT}],
            "messages": messages,
            "temperature": 0.5,
            "tools": [{
                "name": "get_weather",
                "description": "Get the current weather for a location",
                "input_schema": {
                    "type": "object",
                    "properties": schema["properties"],
                    "required": ["location"]
                },
                "type": "custom"
            }]
        })
    }

    async fn respond(
        provider: &AnthropicProvider,
        req: &Request,
        turn: Turn,
    ) -> Result<Response, Error> {
        let fixture = match turn {
            Turn::Initial => "anthropic/function_call_response.json",
            Turn::Followup => "anthropic/followup_response.json",
        };
        let message: MessageResponse = serde_json::from_str(&load_fixture(fixture))?;
        provider.parse_response(&message, req)
    }
}
