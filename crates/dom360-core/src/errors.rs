// ABOUTME: Error taxonomy for the chat client: validation, auth, access, request, connection, storage
// ABOUTME: Defines ClientError, ErrorCode and the key/value StorageError with conversions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

//! # Client Error Types
//!
//! Every fallible operation in the client returns [`ClientResult`]. The variants
//! map one-to-one onto the failure classes a caller has to tell apart:
//!
//! - `Validation` - input rejected before any network call
//! - `AuthenticationRequired` - HTTP 401, the session has been torn down
//! - `AccessDenied` - HTTP 403
//! - `RequestFailed` - any other non-2xx, or an undecodable 2xx body
//! - `Connection` - transport failure or timeout
//! - `Storage` - persistence failure (normally recovered before it gets here)

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable machine-readable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Client-side input validation failed
    ValidationError,
    /// Backend answered 401
    AuthenticationRequired,
    /// Backend answered 403
    AccessDenied,
    /// Backend answered another non-2xx status
    RequestFailed,
    /// Network-level failure or timeout
    ConnectionError,
    /// Persistence read/write failure
    StorageError,
}

impl ErrorCode {
    /// Human-readable description of this error class
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::ValidationError => "The provided input is invalid",
            Self::AuthenticationRequired => "Authentication required, please login again",
            Self::AccessDenied => "You do not have permission to perform this action",
            Self::RequestFailed => "The request to the backend failed",
            Self::ConnectionError => "Could not reach the backend",
            Self::StorageError => "Local storage operation failed",
        }
    }
}

/// Errors raised by the key/value persistence layer
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying medium failed to read or write
    #[error("storage I/O failed for key '{key}': {source}")]
    Io {
        /// Key being accessed
        key: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// Value could not be encoded or decoded as JSON
    #[error("storage serialization failed for key '{key}': {source}")]
    Serialization {
        /// Key being accessed
        key: String,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },
    /// Store refused the write because it is over capacity
    #[error("storage quota exceeded writing key '{key}' ({required} bytes, {available} available)")]
    QuotaExceeded {
        /// Key being written
        key: String,
        /// Bytes the write needed
        required: usize,
        /// Bytes still available
        available: usize,
    },
    /// Store cannot be used at all
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Unified error type for client operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Input rejected before any network call
    #[error("Validation error: {0}")]
    Validation(String),
    /// Backend requires (re-)authentication
    #[error("Authentication required: {0}")]
    AuthenticationRequired(String),
    /// Backend refused access to the resource
    #[error("Access denied: {0}")]
    AccessDenied(String),
    /// Backend answered with a failure status
    #[error("Request failed ({status}): {message}")]
    RequestFailed {
        /// HTTP status code (0 when the failure was a 2xx body that did not decode)
        status: u16,
        /// Server-provided message, or the status line
        message: String,
    },
    /// Network failure or timeout
    #[error("Connection error: {0}")]
    Connection(String),
    /// Persistence failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// Create a validation error
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a request-failed error
    #[must_use]
    pub fn request_failed(status: u16, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            message: message.into(),
        }
    }

    /// Create a connection error
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Machine-readable code for this error
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::AuthenticationRequired(_) => ErrorCode::AuthenticationRequired,
            Self::AccessDenied(_) => ErrorCode::AccessDenied,
            Self::RequestFailed { .. } => ErrorCode::RequestFailed,
            Self::Connection(_) => ErrorCode::ConnectionError,
            Self::Storage(_) => ErrorCode::StorageError,
        }
    }

    /// Single human-readable string surfaced to the caller
    #[must_use]
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Whether the caller must force a re-login
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(self, Self::AuthenticationRequired(_))
    }
}

impl From<StorageError> for ClientError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error.to_string())
    }
}

/// Result type alias for convenience
pub type ClientResult<T> = Result<T, ClientError>;
