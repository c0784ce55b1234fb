use thiserror::Error;

/// Errors from chat backend calls.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    /// The backend could not be configured.
    #[error("backend config: {0}")]
    Config(String),

    /// A network error occurred during the API call.
    #[error("network: {0}")]
    Network(String),

    /// The backend returned an error response.
    #[error("backend api: {0}")]
    Api(String),

    /// The backend response could not be parsed.
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),

    /// The backend did not answer in time.
    #[error("backend timed out after {0}ms")]
    Timeout(u64),
}
