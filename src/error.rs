// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types shared by the transport and storage layers.

/// Application error type.
///
/// Session operations never surface these to their callers; they are
/// translated to `false` or absorbed after logging.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Backend unreachable: {0}")]
    Transport(String),

    #[error("Backend error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupted session data: {0}")]
    CorruptSession(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Fallback message when an error body is JSON without an `error` field.
    pub const REQUEST_FAILED: &'static str = "Request failed";

    /// Fallback message when an error body is missing or not JSON.
    pub const UNKNOWN_ERROR: &'static str = "Unknown error";

    /// Check if this error is an authentication failure.
    ///
    /// Reads are not retried on these.
    pub fn is_auth_error(&self) -> bool {
        match self {
            AppError::Api { status, message } => *status == 401 || message.contains("Token"),
            _ => false,
        }
    }

    /// Human-readable message, without the variant prefix for backend errors.
    pub fn message(&self) -> String {
        match self {
            AppError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for fallible operations.
pub type Result<T> = std::result::Result<T, AppError>;
