//! Error types shared across the crate.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Top-level error, everything converts into it.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Provider error: {0}")]
    Api(#[from] ApiError),

    #[error("Forecast error: {0}")]
    Transform(#[from] TransformError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("No location found for \"{0}\"")]
    LocationNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short message suitable for the status line.
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::Api(e) => e.user_message(),
            Error::Transform(_) => "Failed loading data, please try again later",
            Error::Config(_) => "Invalid configuration. Check your settings.",
            Error::Render(_) => "Failed drawing the chart.",
            Error::LocationNotFound(_) => "Location not found. Check and try again.",
            Error::Io(_) => "A file operation failed.",
        }
    }
}

/// Failures talking to the geocoding, history and forecast services.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request timed out")]
    Timeout,

    #[error("{service} returned status {status}")]
    Status { service: &'static str, status: u16 },

    #[error("could not decode {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    #[error("{service} rejected the request: {message}")]
    Rejected {
        service: &'static str,
        message: String,
    },

    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("transport error: {0}")]
    Transport(String),
}

impl ApiError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::Timeout => "The request timed out. Please try again.",
            ApiError::Status { status, .. } if *status >= 500 => {
                "The weather service is having issues. Please try again later."
            }
            ApiError::Status { .. } => "The request was rejected. Check your settings.",
            ApiError::Decode { .. } => "Received an unexpected response.",
            ApiError::Rejected { .. } => "The request was rejected. Check your settings.",
            ApiError::MissingCredential(_) => "A service credential is missing. Check your settings.",
            ApiError::Transport(_) => "Unable to connect. Check your internet connection.",
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if let Some(status) = e.status() {
            ApiError::Status {
                service: "server",
                status: status.as_u16(),
            }
        } else if e.is_decode() {
            ApiError::Decode {
                service: "server",
                message: e.to_string(),
            }
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

/// Failures shaping a forecast payload into chart series.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("forecast payload has no timeseries")]
    NoData,

    #[error("timeseries node {index} at {time} has neither next_1_hours nor next_6_hours")]
    MissingSummary { index: usize, time: DateTime<Utc> },

    #[error("malformed forecast payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("could not write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("could not parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("could not serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid setting {field}: {message}")]
    Invalid { field: &'static str, message: String },

    #[error("no configuration directory available on this platform")]
    NoConfigDir,
}

/// A single drawing primitive failed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    #[error("could not draw image {0}")]
    Image(String),

    #[error("could not draw path: {0}")]
    Path(String),

    #[error("unknown group {0}")]
    UnknownGroup(String),

    #[error("chart backend failed: {0}")]
    Backend(String),
}
