use super::{
    load_fixture, replay_sse, weather_schema, ProviderTestSetup, TestConfig, Turn, SYSTEM_PROMPT,
    USER_PROMPT,
};
use llm_bridge::{
    Error, ProviderConfig, ProviderKind, Request, Response, StreamingProvider, XaiProvider,
};
use serde_json::{json, Value};

pub struct XaiTestSetup;

impl ProviderTestSetup for XaiTestSetup {
    type Provider = XaiProvider;

    fn config() -> TestConfig {
        TestConfig {
            name: "xAI",
            model: "grok-4",
            call_id: "call_xai_0001",
        }
    }

    fn create_provider() -> XaiProvider {
        XaiProvider::new(ProviderConfig::new(ProviderKind::Xai, Self::config().model))
    }

    fn expected_request(turn: Turn) -> Value {
        let mut messages = vec![
            json!({"role": "ROLE_SYSTEM", "content": [{"text": SYSTEM_PROMPT}]}),
            json!({"role": "ROLE_USER", "content": [{"text": USER_PROMPT}]}),
        ];
        if turn == Turn::Followup {
            messages.push(json!({
                "role": "ROLE_ASSISTANT",
                "content": [{"text": "I'll check the weather in Paris."}],
                "tool_calls": [{
                    "id": "call_xai_0001",
                    "function": {"name": "get_weather", "arguments": r#"{"location":"Paris"}"#}
                }]
            }));
            let result = json!({
                "name": "get_weather",
                "tool_call_id": "call_xai_0001",
                "response": {"report": "Sunny, 22°C"}
            });
            messages.push(json!({
                "role": "ROLE_TOOL",
                "content": [{"text": result.to_string()}]
            }));
        }

        json!({
            "model": "grok-4",
            "messages": messages,
            "max_tokens": 150,
            "temperature": 0.5,
            "logprobs": false,
            "tools": [{
                "function": {
                    "name": "get_weather",
                    "description": "Get the current weather for a location",
                    "parameters": weather_schema().to_string()
                }
            }]
        })
    }

    async fn respond(provider: &XaiProvider, req: &Request, turn: Turn) -> Result<Response, Error> {
        let fixture = match turn {
            Turn::Initial => "xai/function_call_response.sse",
            Turn::Followup => "xai/followup_response.sse",
        };
        replay_sse(&load_fixture(fixture), provider.aggregator(req)).await
    }
}
