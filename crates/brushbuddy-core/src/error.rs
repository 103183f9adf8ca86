//! Core error types for brushbuddy-core.
//!
//! Invalid routine transitions are not errors: they are no-ops that return
//! no events. The types here cover configuration, catalog validation, unmet
//! setup preconditions and presentation-layer failures.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for brushbuddy-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Routine precondition errors
    #[error("Routine error: {0}")]
    Routine(#[from] RoutineError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Could not determine or create the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Failed preconditions surfaced to the caller of a routine command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutineError {
    /// `start` was requested before an avatar was chosen.
    #[error("no avatar selected; choose one before starting the routine")]
    NoIdentitySelected,

    /// An avatar id was empty or only whitespace.
    #[error("avatar id must not be empty")]
    EmptyIdentity,

    /// The requested track title is not in the built-in track list.
    #[error("unknown track: {0}")]
    UnknownTrack(String),
}

/// A failure reported by a presentation adapter.
///
/// The routine session logs and swallows these; they never alter routine
/// progression.
#[derive(Error, Debug)]
#[error("{operation} failed: {message}")]
pub struct PresentationError {
    pub operation: &'static str,
    pub message: String,
}

impl PresentationError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
