//! Drives the `nimbus-weather` binary over stdio with the MCP client.

use mcp::{Error, Server, ServerConfig};
use mockito::Matcher;
use serde_json::json;

fn weather_server(api_url: &str) -> ServerConfig {
    let mut config = ServerConfig::new("weather", env!("CARGO_BIN_EXE_nimbus-weather"));
    config.env.insert("WEATHER_API_KEY".into(), "test-key".into());
    config.env.insert("WEATHER_API_URL".into(), api_url.into());
    config
}

#[tokio::test]
async fn full_session_returns_weather_text() {
    let mut upstream = mockito::Server::new_async().await;
    upstream
        .mock("GET", "/v1/current.json")
        .match_query(Matcher::UrlEncoded("q".into(), "london".into()))
        .with_status(200)
        .with_body(r#"{"current":{"temp_c":14.0,"condition":{"text":"Light rain"}}}"#)
        .create_async()
        .await;

    let server = Server::spawn(weather_server(&format!("{}/v1/current.json", upstream.url())))
        .await
        .unwrap();
    let init = server.initialize().await.unwrap();
    assert_eq!(init.server_info.name, "nimbus-weather");

    let result = server
        .call_tool("get_todays_weather", Some(json!({"city_name": "london"})))
        .await
        .unwrap();
    assert!(result.joined_text().contains("Light rain"));

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn unknown_city_message_reaches_the_client() {
    let mut upstream = mockito::Server::new_async().await;
    upstream
        .mock("GET", "/v1/current.json")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"error":{"code":1006,"message":"No matching location found."}}"#)
        .create_async()
        .await;

    let server = Server::spawn(weather_server(&format!("{}/v1/current.json", upstream.url())))
        .await
        .unwrap();
    server.initialize().await.unwrap();

    let result = server
        .call_tool("get_todays_weather", Some(json!({"city_name": "atlantis"})))
        .await
        .unwrap();
    assert!(result.joined_text().contains("No matching location found."));

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn unreachable_upstream_surfaces_as_tool_failure() {
    let server = Server::spawn(weather_server("http://127.0.0.1:1/v1/current.json"))
        .await
        .unwrap();
    server.initialize().await.unwrap();

    let err = server
        .call_tool("get_todays_weather", Some(json!({"city_name": "london"})))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ToolCallFailed(ref text) if text.contains("unreachable")));

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn unknown_tool_is_a_protocol_error() {
    let server = Server::spawn(weather_server("http://127.0.0.1:1/v1/current.json"))
        .await
        .unwrap();
    server.initialize().await.unwrap();

    let err = server.call_tool("get_forecast", None).await.unwrap_err();
    assert!(matches!(err, Error::JsonRpc(ref e) if e.code == mcp::INVALID_PARAMS));

    server.shutdown().await.unwrap();
}
