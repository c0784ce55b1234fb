//! Tool descriptors advertised to the chat backend.

use std::sync::LazyLock;

use serde_json::json;

use crate::model::ToolSpec;

/// Name of the weather tool.
pub const WEATHER_TOOL: &str = "get_todays_weather";

/// Parameter carrying the city.
pub const CITY_PARAM: &str = "city_name";

static TOOLS: LazyLock<Vec<ToolSpec>> = LazyLock::new(|| {
    vec![ToolSpec {
        name: WEATHER_TOOL.to_string(),
        description: "Get today's current weather for a city. Only use this tool when the \
                      user asks about weather conditions, temperature, rain, wind or the \
                      forecast; never for any other kind of question."
            .to_string(),
        schema: json!({
            "type": "object",
            "properties": {
                CITY_PARAM: {
                    "type": "string",
                    "description": "Name of the city, e.g. \"london\""
                }
            },
            "required": [CITY_PARAM]
        }),
    }]
});

/// All registered tool descriptors, in advertisement order.
pub fn tools() -> &'static [ToolSpec] {
    &TOOLS
}
