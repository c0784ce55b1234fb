//! Whole-turn scenarios through the public runtime API.

use std::collections::VecDeque;
use std::sync::Mutex;

use runtime::tools::{CITY_PARAM, WEATHER_TOOL};
use runtime::{
    Backend, Message, ModelError, ModelRequest, ModelResponse, Orchestrator, Role, Session,
    ToolArguments, ToolCall, ToolError, ToolInvoker, ToolPolicy, Usage,
};
use serde_json::json;

/// Replays canned replies and keeps a copy of each request.
struct FakeModel {
    replies: Mutex<VecDeque<Message>>,
    requests: Mutex<Vec<(Vec<Message>, bool, f32)>>,
}

impl FakeModel {
    fn new(replies: impl IntoIterator<Item = Message>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::default(),
        }
    }
}

impl Backend for FakeModel {
    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        self.requests.lock().unwrap().push((
            request.messages.to_vec(),
            request.options.offers_tools(),
            request.options.temperature,
        ));
        let message = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ModelError::Api("no reply scripted".into()))?;
        Ok(ModelResponse {
            message,
            usage: Usage::default(),
        })
    }
}

/// Weather executor stand-in keyed by city.
#[derive(Default)]
struct FakeWeather {
    cities: Mutex<Vec<String>>,
}

impl ToolInvoker for FakeWeather {
    async fn invoke(
        &self,
        name: &str,
        arguments: &ToolArguments,
    ) -> Result<Option<String>, ToolError> {
        if name != WEATHER_TOOL {
            return Err(ToolError::NotFound(name.to_string()));
        }
        let city = arguments.city().ok_or(ToolError::MissingCity)?;
        if runtime::tools::is_no_city(city) {
            return Ok(None);
        }
        self.cities.lock().unwrap().push(city.to_string());
        if city.eq_ignore_ascii_case("atlantis") {
            return Ok(Some(
                json!({"error": {"code": 1006, "message": "No matching location found."}})
                    .to_string(),
            ));
        }
        Ok(Some(
            json!({
                "location": {"name": "London"},
                "current": {"temp_c": 14.0, "condition": {"text": "Light rain"}}
            })
            .to_string(),
        ))
    }
}

#[tokio::test]
async fn arithmetic_question_is_answered_without_tools() {
    let model = FakeModel::new([Message::assistant("13 + 13 = 26")]);
    let mut session = Session::new(Orchestrator::new(model, FakeWeather::default(), "llama3.2"));

    let answer = session.chat("What's 13 + 13?", ToolPolicy::Auto).await;

    assert_eq!(answer.text(), "13 + 13 = 26");
    let orch = session.orchestrator();
    let requests = orch.backend().requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].1, "tools must not be offered");
    assert!(orch.invoker().cities.lock().unwrap().is_empty());
}

#[tokio::test]
async fn london_weather_goes_through_the_tool() {
    let model = FakeModel::new([
        Message::assistant("").with_tool_calls(vec![ToolCall::new(
            "call_1",
            WEATHER_TOOL,
            json!({ CITY_PARAM: "london" }),
        )]),
        Message::assistant("It's 14°C with light rain in London."),
    ]);
    let mut session = Session::new(Orchestrator::new(model, FakeWeather::default(), "llama3.2"));

    let answer = session
        .chat("What's the weather in London today?", ToolPolicy::Auto)
        .await;

    assert_eq!(answer.text(), "It's 14°C with light rain in London.");

    let orch = session.orchestrator();
    assert_eq!(*orch.invoker().cities.lock().unwrap(), ["london"]);

    let requests = orch.backend().requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    let (first, first_tools, first_temp) = &requests[0];
    assert_eq!(first.len(), 1);
    assert!(*first_tools);
    assert!(first_temp < &0.5);

    let (second, second_tools, _) = &requests[1];
    assert!(!*second_tools);
    let roles: Vec<_> = second.iter().map(|m| m.role).collect();
    assert_eq!(roles, [Role::User, Role::Assistant, Role::Tool]);
    assert_eq!(second[2].tool_call_id.as_deref(), Some("call_1"));
    assert!(second[2].content.contains("Light rain"));

    // Only the user turn and the final answer are remembered.
    assert_eq!(session.conversation().len(), 2);
}

#[tokio::test]
async fn unknown_city_is_explained_by_the_second_pass() {
    let model = FakeModel::new([
        Message::assistant("").with_tool_calls(vec![ToolCall::new(
            "call_1",
            WEATHER_TOOL,
            json!({ CITY_PARAM: "atlantis" }),
        )]),
        Message::assistant("I couldn't find a place called Atlantis."),
    ]);
    let mut session = Session::new(Orchestrator::new(model, FakeWeather::default(), "llama3.2"));

    let answer = session
        .chat("What's the weather in Atlantis?", ToolPolicy::Auto)
        .await;

    assert_eq!(answer.text(), "I couldn't find a place called Atlantis.");
    let requests = session.orchestrator().backend().requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    let (second, _, _) = &requests[1];
    assert!(second[2].content.contains("No matching location found."));
}

#[tokio::test]
async fn nowhere_sentinel_keeps_the_first_answer() {
    let model = FakeModel::new([Message::assistant("Which city?").with_tool_calls(vec![
        ToolCall::new("call_1", WEATHER_TOOL, json!({ CITY_PARAM: "Nowhere" })),
    ])]);
    let mut session = Session::new(Orchestrator::new(model, FakeWeather::default(), "llama3.2"));

    let answer = session.chat("Is it going to rain?", ToolPolicy::Auto).await;

    assert_eq!(answer.text(), "Which city?");
    let orch = session.orchestrator();
    assert_eq!(orch.backend().requests.lock().unwrap().len(), 1);
    assert!(orch.invoker().cities.lock().unwrap().is_empty());
}

#[tokio::test]
async fn backend_outage_is_reported_and_recoverable() {
    let model = FakeModel::new([]);
    let mut session = Session::new(Orchestrator::new(model, FakeWeather::default(), "llama3.2"));

    let answer = session.chat("hello", ToolPolicy::Off).await;
    assert!(answer.is_failed());
    assert!(answer.text().contains("no reply scripted"));
    assert_eq!(session.conversation().len(), 2);
}
