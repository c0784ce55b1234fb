//! MCP stdio server exposing today's weather for a city.
//!
//! Configuration comes from the environment: `WEATHER_API_KEY` (required)
//! and `WEATHER_API_URL` (optional, defaults to WeatherAPI.com).

mod config;
mod service;

pub use config::{
    API_KEY_ENV, API_URL_ENV, ConfigError, DEFAULT_API_URL, DEFAULT_TIMEOUT, WeatherConfig,
};
pub use service::{CITY_PARAM, TOOL_NAME, WeatherService};
