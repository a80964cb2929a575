//! # AppError
//!
//! Centralized error handling for the pastebin crates.
//! Every engine outcome other than success is one of these variants.

use std::fmt;
use thiserror::Error;

/// Why a paste could not be served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// No record under this id.
    Missing,
    /// The deadline passed; the record has been evicted.
    Expired,
    /// The view budget is spent. Only reported by the consuming path.
    ViewLimitExceeded,
}

impl NotFoundReason {
    pub fn message(self) -> &'static str {
        match self {
            Self::Missing => "Not found",
            Self::Expired => "Expired",
            Self::ViewLimitExceeded => "View limit exceeded",
        }
    }
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// The primary error type for all pb-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed creation input; nothing was persisted.
    #[error("validation error on {field}: {message}")]
    ValidationError {
        field: &'static str,
        message: String,
    },

    /// Unknown, expired, or (consuming path only) view-exhausted paste.
    #[error("paste unavailable: {0}")]
    NotFound(NotFoundReason),

    /// Infrastructure failure (e.g., Redis unreachable, corrupt record)
    #[error("store error: {0}")]
    Store(String),

    /// Concurrent consumers kept winning the conditional update.
    #[error("too much contention on paste {0}")]
    Contention(String),
}

impl AppError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field,
            message: message.into(),
        }
    }

    pub fn store(err: impl fmt::Display) -> Self {
        Self::Store(err.to_string())
    }
}

/// A specialized Result type for pastebin logic.
pub type Result<T> = std::result::Result<T, AppError>;
