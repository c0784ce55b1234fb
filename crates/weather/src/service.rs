//! The `get_todays_weather` tool.

use mcp::{CallToolResult, Implementation, JsonRpcError, Tool, ToolService};
use serde_json::{Value, json};

use crate::config::{ConfigError, WeatherConfig};

pub const TOOL_NAME: &str = "get_todays_weather";
pub const CITY_PARAM: &str = "city_name";

/// Current-conditions lookup against a WeatherAPI-compatible endpoint.
pub struct WeatherService {
    client: reqwest::Client,
    config: WeatherConfig,
}

impl WeatherService {
    pub fn new(config: WeatherConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Fetch today's conditions for `city`, returning the upstream body as-is.
    ///
    /// Error statuses still yield the body: WeatherAPI explains them there
    /// (for example "No matching location found.") and the model relays it.
    /// Only transport and read failures are errors.
    pub async fn fetch(&self, city: &str) -> Result<String, String> {
        let url = reqwest::Url::parse_with_params(
            self.config.api_url.as_str(),
            [("key", self.config.api_key.as_str()), ("q", city)],
        )
        .map_err(|e| format!("bad request url: {e}"))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("weather service unreachable: {e}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("failed to read weather response: {e}"))?;

        if !status.is_success() {
            tracing::debug!(city, %status, "weather service returned an error status");
        }
        Ok(body)
    }
}

fn city_argument(arguments: Option<&Value>) -> Option<&str> {
    arguments?
        .get(CITY_PARAM)?
        .as_str()
        .map(str::trim)
        .filter(|city| !city.is_empty())
}

impl ToolService for WeatherService {
    fn info(&self) -> Implementation {
        Implementation {
            name: "nimbus-weather".into(),
            version: Some(env!("CARGO_PKG_VERSION").into()),
        }
    }

    fn tools(&self) -> Vec<Tool> {
        vec![Tool {
            name: TOOL_NAME.into(),
            description: Some("Get today's weather for a city.".into()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    CITY_PARAM: {
                        "type": "string",
                        "description": "Name of the city, e.g. london"
                    }
                },
                "required": [CITY_PARAM]
            }),
        }]
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<CallToolResult, JsonRpcError> {
        if name != TOOL_NAME {
            return Err(JsonRpcError::invalid_params(format!("unknown tool: {name}")));
        }
        let city = city_argument(arguments.as_ref())
            .ok_or_else(|| JsonRpcError::invalid_params(format!("missing {CITY_PARAM}")))?;

        match self.fetch(city).await {
            Ok(body) => Ok(CallToolResult::text(body)),
            Err(reason) => {
                tracing::warn!(city, %reason, "weather lookup failed");
                Ok(CallToolResult::error(reason))
            }
        }
    }
}
