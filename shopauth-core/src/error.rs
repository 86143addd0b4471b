//! Error types for the shopauth two-factor core
//!
//! This module defines all error types used throughout the application,
//! providing consistent error handling and user-friendly error messages.

use thiserror::Error;

/// Main error type for the shopauth application
#[derive(Error, Debug)]
pub enum ShopAuthError {
    /// Errors related to configuration loading/parsing
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Errors raised by the enrollment store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Errors related to OTP/TOTP operations
    #[error("OTP error: {0}")]
    Otp(#[from] OtpError),

    /// Malformed caller requests (missing fields, unknown actions)
    #[error("Bad request: {0}")]
    Request(#[from] RequestError),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON encoding/decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {path}")]
    LoadFailed { path: String },

    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },

    #[error("Configuration validation error: {message}")]
    ValidationError { message: String },

    #[error("I/O error: {message}")]
    IoError { message: String },
}

/// Enrollment store errors
///
/// Adapter failures carry the adapter's own message and are never retried
/// by the core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Enrollment store unavailable: {message}")]
    Unavailable { message: String },

    #[error("Failed to read enrollment store: {message}")]
    ReadFailed { message: String },

    #[error("Failed to write enrollment store: {message}")]
    WriteFailed { message: String },

    #[error("Enrollment store rejected record: {message}")]
    Rejected { message: String },
}

/// OTP/TOTP operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OtpError {
    #[error("Invalid Base32 secret")]
    InvalidBase32,

    #[error("System time error")]
    TimeError,

    #[error("Invalid TOTP period: must be greater than zero")]
    InvalidPeriod,

    #[error("Invalid TOTP digit count: {digits}")]
    InvalidDigits { digits: u32 },
}

/// Caller request errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Missing secret or token")]
    MissingSecretOrToken,

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Unknown action")]
    UnknownAction,

    #[error("Malformed request: {message}")]
    Malformed { message: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ShopAuthError>;
