//! Error types for site rendering

use thiserror::Error;

/// Errors that can occur while loading site configuration or schedules
#[derive(Error, Debug)]
pub enum SiteError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Schedule endpoint answered with a non-success status
    #[error("Schedule for {day} unavailable ({status})")]
    ScheduleUnavailable { day: String, status: u16 },

    /// Invalid schedule base URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Day name that cannot be mapped to a schedule file
    #[error("Invalid schedule day: {0:?}")]
    InvalidDay(String),

    /// IO error reading a local schedule
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for site operations
pub type Result<T> = std::result::Result<T, SiteError>;
