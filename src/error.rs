// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the oracle.

use std::fmt;

/// Result type alias for oracle operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Oracle error types.
#[derive(Debug)]
pub enum Error {
    /// Configuration error
    Config(String),
    /// Device error
    Device(DeviceError),
    /// Validation error
    Validation(ValidationError),
    /// Server error
    Server(String),
    /// IO error
    Io(std::io::Error),
    /// Serialization error
    Serialization(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Device(e) => write!(f, "Device error: {}", e),
            Error::Validation(e) => write!(f, "Validation error: {}", e),
            Error::Server(msg) => write!(f, "Server error: {}", msg),
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Device(e) => Some(e),
            Error::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl Error {
    /// Short machine-readable kind, used in request logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::Device(_) => "device",
            Error::Validation(_) => "validation",
            Error::Server(_) => "server",
            Error::Io(_) => "io",
            Error::Serialization(_) => "serialization",
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<DeviceError> for Error {
    fn from(e: DeviceError) -> Self {
        Error::Device(e)
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Validation(e)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Device-specific errors.
#[derive(Debug, Clone)]
pub enum DeviceError {
    /// Device unavailable
    Unavailable(String),
    /// Execution failed
    ExecutionFailed(String),
    /// Invalid request
    InvalidRequest(String),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::Unavailable(msg) => write!(f, "Device unavailable: {}", msg),
            DeviceError::ExecutionFailed(msg) => write!(f, "Execution failed: {}", msg),
            DeviceError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
        }
    }
}

impl std::error::Error for DeviceError {}

/// Validation errors.
#[derive(Debug)]
pub enum ValidationError {
    /// Field validation failed
    Field { field: String, message: String },
    /// Mode string is not one of the known hybrid routines
    UnknownMode(String),
    /// Resource limit exceeded
    ResourceLimit {
        resource: String,
        limit: u64,
        requested: u64,
    },
}

impl ValidationError {
    /// Shorthand for a field error.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::Field {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Field { field, message } => {
                write!(f, "Field '{}': {}", field, message)
            }
            ValidationError::UnknownMode(mode) => write!(f, "Invalid mode: {}", mode),
            ValidationError::ResourceLimit {
                resource,
                limit,
                requested,
            } => {
                write!(
                    f,
                    "Resource limit exceeded for {}: limit={}, requested={}",
                    resource, limit, requested
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
