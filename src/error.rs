use reqwest::StatusCode;
use thiserror::Error;

/// The category of a [`WeatherError`], for callers that only need to branch on
/// what kind of failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
    MalformedResponse,
}

/// Everything a fetch or a parse can fail with.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The call could not be attempted: no API key, an unusable base URL, an
    /// unreadable config file.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    MalformedResponse(#[from] MalformedResponse),
}

impl WeatherError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WeatherError::Configuration(_) => ErrorKind::Configuration,
            WeatherError::Transport(_) => ErrorKind::Transport,
            WeatherError::MalformedResponse(_) => ErrorKind::MalformedResponse,
        }
    }
}

/// The request went out (or tried to) but no usable JSON document came back.
///
/// URLs carried here have the API key redacted.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Network request failed for {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("VisualCrossing API returned status {status} for URL {url}: {message}")]
    HttpStatus {
        url: String,
        status: StatusCode,
        message: String,
    },

    #[error("Unable to read response body from {url}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Response body is empty")]
    EmptyBody,

    #[error("Response body is not valid JSON")]
    InvalidJson(#[source] serde_json::Error),
}

/// The response was JSON but does not have the shape of a timeline document.
///
/// `path` locates the offending record, e.g. `days[2].events[0]`.
#[derive(Debug, Error)]
pub enum MalformedResponse {
    #[error("Missing required key '{key}' in {path}")]
    MissingKey { path: String, key: String },

    #[error("Required key '{key}' in {path} is null")]
    NullValue { path: String, key: String },

    #[error("Key '{key}' in {path} is not a {expected}")]
    WrongType {
        path: String,
        key: String,
        expected: &'static str,
    },

    #[error("Unable to parse '{value}' in key '{key}' of {path}")]
    BadTimestamp {
        path: String,
        key: String,
        value: String,
        #[source]
        source: time::error::Parse,
    },

    #[error("Expected a JSON object at {path}")]
    NotAnObject { path: String },
}
