use std::time::Duration;

use thiserror::Error;

/// Fallback shown when the proxy reports a failure without a message.
pub const API_ERROR_FALLBACK: &str = "Unable to fetch weather data. Please try again later.";

/// Failure categories surfaced by the weather client.
///
/// Variants are listed in classification priority order: a failure that fits
/// several categories is always reported as the first matching one.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The city was empty after trimming or longer than 100 characters.
    /// No request was issued.
    #[error("invalid city name: {0:?}")]
    InvalidCity(String),

    /// The response was not JSON, or its JSON could not be parsed. This
    /// usually means the proxy is not running behind the configured URL.
    #[error("backend unavailable: {reason}")]
    BackendUnavailable { reason: String },

    #[error("request timed out after {}ms", .after.as_millis())]
    Timeout { after: Duration },

    /// The proxy answered, but reported a failure.
    #[error(
        "weather API error{}: {message}",
        .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
    )]
    Api { status: Option<u16>, message: String },

    /// DNS failure, refused connection and similar transport problems.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("unexpected error: {0}")]
    Unknown(String),
}

impl WeatherError {
    /// Message suitable for showing to the user as-is.
    pub fn user_message(&self) -> &str {
        match self {
            WeatherError::InvalidCity(_) => "Please enter a valid city name (1-100 characters).",
            WeatherError::BackendUnavailable { .. } => {
                "Backend server not running. Please start the weather proxy and try again."
            }
            WeatherError::Timeout { .. } => "Request timed out. Please try again.",
            WeatherError::Api { message, .. } => message,
            WeatherError::Network(_) => "Network error. Please check your internet connection.",
            WeatherError::Unknown(_) => "An unexpected error occurred. Please try again.",
        }
    }

    pub fn is_invalid_city(&self) -> bool {
        matches!(self, WeatherError::InvalidCity(_))
    }

    pub fn is_backend_unavailable(&self) -> bool {
        matches!(self, WeatherError::BackendUnavailable { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, WeatherError::Timeout { .. })
    }

    pub(crate) fn backend_unavailable(reason: impl Into<String>) -> Self {
        WeatherError::BackendUnavailable { reason: reason.into() }
    }
}

/// Failures of the raw key-value layer. These never leave
/// [`LocalStore`](crate::store::LocalStore); they are logged and swallowed there.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    #[error("storage I/O error for key {key:?}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode value for key {key:?}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode value for key {key:?}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage backend poisoned")]
    Poisoned,
}
