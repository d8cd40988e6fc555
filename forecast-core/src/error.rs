//! Error taxonomy for the forecast widget.
//!
//! The `Display` text of every variant is the message shown to the user, so
//! rendering an error is just `err.to_string()`. Technical details are kept in
//! `detail` fields for logging only.

use thiserror::Error;

/// Rejected user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a valid city name.")]
    Empty,
}

/// Problems with the startup configuration, reported at fetch time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Weather API key is not configured. Set WEATHERBIT_API_KEY or run `forecast configure`.")]
    MissingKey,

    #[error("Weather service URL is invalid: {0}")]
    InvalidBaseUrl(String),
}

/// Failure of a single provider fetch. Every variant is terminal for that request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport failure: DNS, refused connection, interrupted body.
    #[error("Failed to fetch data. Please check your internet connection.")]
    Network { detail: String },

    /// The provider answered with a non-success status.
    #[error("Failed to fetch weather data. Error: {0}")]
    Http(u16),

    /// The provider answered successfully but without any daily entries.
    #[error("No weather data found for the city.")]
    NoData,

    /// The provider answered successfully with a body we could not decode.
    #[error("Failed to fetch data. Please check your internet connection.")]
    Decode { detail: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl FetchError {
    pub(crate) fn network(err: reqwest::Error) -> Self {
        // Request URLs carry the API key.
        Self::Network { detail: err.without_url().to_string() }
    }
}

/// Anything that can stop a query from producing a forecast.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl WidgetError {
    /// Fixed, kind-specific message for display.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::API_KEY_ENV;

    #[test]
    fn messages_are_fixed_per_kind() {
        assert_eq!(
            WidgetError::from(ValidationError::Empty).user_message(),
            "Please enter a valid city name."
        );
        assert_eq!(
            WidgetError::from(FetchError::NoData).user_message(),
            "No weather data found for the city."
        );
        assert_eq!(
            WidgetError::from(FetchError::Network { detail: "dns error".into() }).user_message(),
            "Failed to fetch data. Please check your internet connection."
        );
    }

    #[test]
    fn http_message_embeds_status() {
        let msg = WidgetError::from(FetchError::Http(404)).user_message();
        assert!(msg.contains("404"), "got: {msg}");
    }

    #[test]
    fn decode_detail_is_not_displayed() {
        let err = FetchError::Decode { detail: "expected value at line 1".into() };
        assert!(!err.to_string().contains("line 1"));
    }

    #[test]
    fn missing_key_points_at_env_var() {
        let err = FetchError::from(ConfigError::MissingKey);
        assert!(err.to_string().contains(API_KEY_ENV));
    }
}
