//! Core error types for chaintimer-core.
//!
//! The sequencer itself never surfaces errors to its caller: invalid input and
//! illegal-state calls are no-ops, and collaborator failures are logged at the
//! call site. These types describe what the collaborators and the supporting
//! layers (config, duration parsing) can report.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for chaintimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dotted key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be resolved or created
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
}

/// Errors raised by a [`Clock`](crate::timer::Clock) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    /// The scheduler refused to create a subscription
    #[error("subscription refused: {0}")]
    Refused(String),

    /// No async runtime is available to drive ticks
    #[error("no runtime available to drive ticks")]
    NoRuntime,
}

/// Errors raised by a [`CueEmitter`](crate::timer::CueEmitter).
#[derive(Error, Debug)]
pub enum CueError {
    /// Writing the cue to its sink failed
    #[error("cue output failed: {0}")]
    Output(#[from] std::io::Error),

    /// The cue device is unavailable
    #[error("cue device unavailable: {0}")]
    Unavailable(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Duration input was empty
    #[error("duration is empty")]
    EmptyDuration,

    /// Duration input contained something other than digits
    #[error("invalid duration '{0}': expected digits (MMSS) or M:SS")]
    MalformedDuration(String),

    /// Raw keypad input is wider than the keypad allows
    #[error("duration '{raw}' exceeds {max_digits} digits")]
    TooManyDigits { raw: String, max_digits: usize },

    /// Duration parsed to zero seconds
    #[error("duration must be greater than zero")]
    ZeroDuration,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
