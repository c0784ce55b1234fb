//! Tool-related types.

use super::ToolError;
use super::registry::CITY_PARAM;
use crate::model::{Message, ToolCall};
use serde_json::{Map, Value};

/// Alias the model sometimes uses instead of [`CITY_PARAM`].
pub const CITY_ALIAS: &str = "city";

/// Placeholder location some models emit when they have no city; never
/// forwarded to the executor.
pub const NO_CITY_SENTINEL: &str = "nowhere";

/// Arguments of a tool call, guaranteed to be a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments(pub Map<String, Value>);

impl ToolArguments {
    /// The city argument, preferring `city_name` over `city`.
    ///
    /// Blank values count as absent.
    pub fn city(&self) -> Option<&str> {
        [CITY_PARAM, CITY_ALIAS]
            .iter()
            .filter_map(|key| self.0.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .find(|city| !city.is_empty())
    }
}

impl TryFrom<Value> for ToolArguments {
    type Error = ToolError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) if map.is_empty() => {
                Err(ToolError::InvalidArguments("empty arguments".into()))
            }
            Value::Object(map) => Ok(Self(map)),
            // Some backends encode arguments as a JSON string.
            Value::String(raw) if !raw.trim().is_empty() => {
                let decoded: Value = serde_json::from_str(&raw)
                    .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
                match decoded {
                    Value::String(_) => Err(ToolError::InvalidArguments(
                        "arguments are a nested string".into(),
                    )),
                    other => Self::try_from(other),
                }
            }
            Value::Null | Value::String(_) => {
                Err(ToolError::InvalidArguments("missing arguments".into()))
            }
            other => Err(ToolError::InvalidArguments(format!(
                "expected an object, got {other}"
            ))),
        }
    }
}

/// Whether `city` is the placeholder for "no location".
pub fn is_no_city(city: &str) -> bool {
    city.trim().eq_ignore_ascii_case(NO_CITY_SENTINEL)
}

/// A well-formed tool call, ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
    pub arguments: ToolArguments,
}

impl TryFrom<&ToolCall> for ToolInvocation {
    type Error = ToolError;

    fn try_from(call: &ToolCall) -> Result<Self, Self::Error> {
        let function = call.function.as_ref().ok_or(ToolError::MissingFunction)?;
        if function.name.trim().is_empty() {
            return Err(ToolError::MissingFunction);
        }

        let arguments = ToolArguments::try_from(function.arguments.clone())?;
        if arguments.city().is_none() {
            return Err(ToolError::MissingCity);
        }

        Ok(Self {
            id: call.id.clone(),
            name: function.name.clone(),
            arguments,
        })
    }
}

/// Output of a dispatched tool call, keyed by the originating call id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub tool_name: String,
    pub content: String,
}

impl From<ToolResult> for Message {
    fn from(result: ToolResult) -> Self {
        Message::tool(result.tool_call_id, result.tool_name, result.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FunctionCall;
    use serde_json::json;

    fn args(value: Value) -> ToolArguments {
        ToolArguments::try_from(value).unwrap()
    }

    #[test]
    fn city_prefers_city_name() {
        let a = args(json!({"city": "paris", "city_name": "london"}));
        assert_eq!(a.city(), Some("london"));
    }

    #[test]
    fn city_falls_back_to_alias() {
        assert_eq!(args(json!({"city": " Oslo "})).city(), Some("Oslo"));
        assert_eq!(args(json!({"city_name": "", "city": "Rome"})).city(), Some("Rome"));
    }

    #[test]
    fn city_ignores_non_strings() {
        assert_eq!(args(json!({"city_name": 42})).city(), None);
    }

    #[test]
    fn string_encoded_arguments_are_decoded() {
        let a = args(json!("{\"city_name\": \"london\"}"));
        assert_eq!(a.city(), Some("london"));
    }

    #[test]
    fn unusable_arguments_are_rejected() {
        for value in [json!(null), json!({}), json!(""), json!([1]), json!("not json")] {
            assert!(
                matches!(ToolArguments::try_from(value.clone()), Err(ToolError::InvalidArguments(_))),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn sentinel_is_case_insensitive() {
        assert!(is_no_city("nowhere"));
        assert!(is_no_city(" Nowhere "));
        assert!(!is_no_city("norwich"));
    }

    #[test]
    fn invocation_requires_function() {
        let call = ToolCall {
            id: "1".into(),
            function: None,
        };
        assert_eq!(ToolInvocation::try_from(&call), Err(ToolError::MissingFunction));

        let call = ToolCall {
            id: "2".into(),
            function: Some(FunctionCall {
                name: " ".into(),
                arguments: json!({"city_name": "london"}),
            }),
        };
        assert_eq!(ToolInvocation::try_from(&call), Err(ToolError::MissingFunction));
    }

    #[test]
    fn invocation_requires_city() {
        let call = ToolCall::new("1", "get_todays_weather", json!({"country": "uk"}));
        assert_eq!(ToolInvocation::try_from(&call), Err(ToolError::MissingCity));
    }

    #[test]
    fn well_formed_invocation() {
        let call = ToolCall::new("abc", "get_todays_weather", json!({"city_name": "london"}));
        let invocation = ToolInvocation::try_from(&call).unwrap();
        assert_eq!(invocation.id, "abc");
        assert_eq!(invocation.name, "get_todays_weather");
        assert_eq!(invocation.arguments.city(), Some("london"));
    }

    #[test]
    fn result_becomes_tool_message() {
        let message: Message = ToolResult {
            tool_call_id: "abc".into(),
            tool_name: "get_todays_weather".into(),
            content: "{}".into(),
        }
        .into();
        assert_eq!(message.tool_call_id.as_deref(), Some("abc"));
        assert_eq!(message.content, "{}");
    }
}
