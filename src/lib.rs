//! Terminal weather charts: place search, a 48 hour forecast chart and the
//! observed weather for a chosen date.

pub mod api;
pub mod app;
pub mod chart;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod icons;
pub mod report;
pub mod series;
pub mod units;
pub mod weather;

pub use error::{ApiError, ConfigError, Error, RenderError, TransformError};
