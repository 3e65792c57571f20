//! # Error Types
//!
//! Structured error types for quote_core. Only failures that stop a quotation
//! from being produced live here. Per-line degradations (a missing base price,
//! an unknown location or route) are not errors: they flow through the
//! pipeline as tagged values, see [`crate::lookup::Lookup`] and
//! [`crate::pricing::PriceStatus`].
//!
//! ## Example
//!
//! ```rust
//! use quote_core::errors::{QuoteError, QuoteResult};
//!
//! fn check_area(area_m2: f64) -> QuoteResult<()> {
//!     if area_m2 <= 0.0 {
//!         return Err(QuoteError::invalid_specification(
//!             "building_area",
//!             area_m2.to_string(),
//!             "Building area must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_area(-5.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for quote_core operations
pub type QuoteResult<T> = Result<T, QuoteError>;

/// Structured error type for quotation operations.
///
/// Configuration failures are kept distinct from specification failures so a
/// host can tell "your reference feed is broken" apart from "your request is
/// nonsense".
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum QuoteError {
    /// The project specification is outside the accepted range
    #[error("Invalid specification for '{field}': {value} - {reason}")]
    InvalidSpecification {
        field: String,
        value: String,
        reason: String,
    },

    /// A reference-data feed is missing, unreadable or malformed
    #[error("Configuration error in {feed}: {reason}")]
    Configuration { feed: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another process
    #[error("File locked: '{path}' is held by {holder}")]
    FileLocked { path: String, holder: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch on a saved quotation
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (report rendering and the like)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl QuoteError {
    /// Create an InvalidSpecification error
    pub fn invalid_specification(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        QuoteError::InvalidSpecification {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a Configuration error
    pub fn configuration(feed: impl Into<String>, reason: impl Into<String>) -> Self {
        QuoteError::Configuration {
            feed: feed.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        QuoteError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, holder: impl Into<String>) -> Self {
        QuoteError::FileLocked {
            path: path.into(),
            holder: holder.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, QuoteError::FileLocked { .. })
    }

    /// True for failures caused by reference data rather than by the request
    pub fn is_configuration(&self) -> bool {
        matches!(self, QuoteError::Configuration { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            QuoteError::InvalidSpecification { .. } => "INVALID_SPECIFICATION",
            QuoteError::Configuration { .. } => "CONFIGURATION_ERROR",
            QuoteError::FileError { .. } => "FILE_ERROR",
            QuoteError::FileLocked { .. } => "FILE_LOCKED",
            QuoteError::SerializationError { .. } => "SERIALIZATION_ERROR",
            QuoteError::VersionMismatch { .. } => "VERSION_MISMATCH",
            QuoteError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = QuoteError::configuration("pricing.base_prices", "price for C001 is negative");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"Configuration\""));
        let roundtrip: QuoteError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            QuoteError::invalid_specification("floors", "0", "at least one floor").error_code(),
            "INVALID_SPECIFICATION"
        );
        assert_eq!(QuoteError::configuration("feed", "bad").error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_configuration_is_distinct() {
        assert!(QuoteError::configuration("feed", "bad").is_configuration());
        assert!(!QuoteError::invalid_specification("a", "b", "c").is_configuration());
        assert!(QuoteError::file_locked("ref.json", "writer").is_recoverable());
    }
}
