use llm_bridge::{Content, Part, Provider, Request, Role};
use serde::Serialize;

use super::providers::{
    anthropic::AnthropicTestSetup, openai::OpenAITestSetup, weather_config, weather_result,
    xai::XaiTestSetup, ProviderTestSetup, Turn, SYSTEM_PROMPT, USER_PROMPT,
};

/// Run the function calling round trip for a specific provider
async fn run_function_calling_test<T>() -> Result<(), Box<dyn std::error::Error>>
where
    T: ProviderTestSetup,
    <T::Provider as Provider>::Request: Serialize,
{
    let config = T::config();
    let provider = T::create_provider();

    let mut request = Request::new(vec![Content::user(USER_PROMPT)])
        .with_system(Content::system(SYSTEM_PROMPT))
        .with_config(weather_config());

    // Step 1: the initial request offers the weather function
    let native = provider.build_request(&mut request)?;
    assert_eq!(
        serde_json::to_value(&native)?,
        T::expected_request(Turn::Initial),
        "{}: initial request payload",
        config.name
    );

    // Step 2: the model answers with a function call
    let response = T::respond(&provider, &request, Turn::Initial).await?;
    let calls = response.function_calls();
    assert_eq!(calls.len(), 1, "{}: expected one function call", config.name);

    let weather_call = calls[0].clone();
    assert_eq!(weather_call.name, "get_weather", "{}: function name", config.name);
    assert_eq!(
        weather_call.id.as_deref(),
        Some(config.call_id),
        "{}: function call id",
        config.name
    );
    assert_eq!(
        weather_call.args.get("location").and_then(|v| v.as_str()),
        Some("Paris"),
        "{}: function arguments",
        config.name
    );
    assert_eq!(response.text(), "I'll check the weather in Paris.");
    assert!(!response.partial);

    // Step 3: the model turn and the function result go back in the conversation
    let model_turn = response.content.clone().ok_or("response has no content")?;
    assert_eq!(model_turn.role, Role::Model);
    request.contents.push(model_turn);

    request.contents.push(Content::new(
        Role::User,
        vec![Part::function_response(
            weather_call.id.clone(),
            "get_weather",
            weather_result(),
        )],
    ));

    let native = provider.build_request(&mut request)?;
    assert_eq!(
        serde_json::to_value(&native)?,
        T::expected_request(Turn::Followup),
        "{}: follow-up request payload",
        config.name
    );

    // Step 4: the follow-up answer is plain text
    let followup = T::respond(&provider, &request, Turn::Followup).await?;
    assert!(followup.function_calls().is_empty());
    assert_eq!(
        followup.text(),
        "It's sunny in Paris right now, around 22°C.",
        "{}: follow-up text",
        config.name
    );

    Ok(())
}

#[tokio::test]
async fn test_openai_function_calling_e2e() {
    run_function_calling_test::<OpenAITestSetup>()
        .await
        .expect("OpenAI function calling test failed");
}

#[tokio::test]
async fn test_anthropic_function_calling_e2e() {
    run_function_calling_test::<AnthropicTestSetup>()
        .await
        .expect("Anthropic function calling test failed");
}

#[tokio::test]
async fn test_xai_function_calling_e2e() {
    run_function_calling_test::<XaiTestSetup>()
        .await
        .expect("xAI function calling test failed");
}
