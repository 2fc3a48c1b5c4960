// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for local node-side failures.
//!
//! Remote and protocol failures never surface as `Err` in this crate: they are
//! reported asynchronously as [`StatusCode`](crate::status::StatusCode) values
//! inside completion notifications. The error types here cover the remaining
//! local failures, which are all parse or configuration problems:
//!
//! ```text
//! AxonError
//! └── Configuration - Invalid node IDs, index ranges, data types, settings
//! ```
//!
//! # Examples
//!
//! ```
//! use axon_opcua::error::{AxonError, ConfigurationError};
//!
//! let error = AxonError::configuration(ConfigurationError::invalid_node_id(
//!     "ns=2;x=oops",
//!     "Unknown identifier type",
//! ));
//! assert!(error.to_string().contains("ns=2;x=oops"));
//! ```

use thiserror::Error;

/// Result alias used throughout the crate.
pub type AxonResult<T> = Result<T, AxonError>;

// =============================================================================
// AxonError - Main Error Type
// =============================================================================

/// The main error type for local node operations.
#[derive(Debug, Error)]
pub enum AxonError {
    /// Configuration and parse errors.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),
}

impl AxonError {
    /// Creates a configuration error.
    #[inline]
    pub fn configuration(error: ConfigurationError) -> Self {
        Self::Configuration(error)
    }
}

// =============================================================================
// ConfigurationError
// =============================================================================

/// Errors caused by invalid user-supplied identifiers or settings.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A node ID string could not be parsed.
    #[error("Invalid node ID '{input}': {reason}")]
    InvalidNodeId {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An index range selector could not be parsed.
    #[error("Invalid index range '{input}': {reason}")]
    InvalidIndexRange {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A data type name is not recognized.
    #[error("Invalid data type '{input}'")]
    InvalidDataType {
        /// The rejected input.
        input: String,
    },

    /// Monitoring settings failed validation.
    #[error("Invalid monitoring settings: {reason}")]
    InvalidMonitoringSettings {
        /// Why validation failed.
        reason: String,
    },
}

impl ConfigurationError {
    /// Creates an invalid node ID error.
    pub fn invalid_node_id(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidNodeId {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid index range error.
    pub fn invalid_index_range(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIndexRange {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid data type error.
    pub fn invalid_data_type(input: impl Into<String>) -> Self {
        Self::InvalidDataType {
            input: input.into(),
        }
    }

    /// Creates an invalid monitoring settings error.
    pub fn invalid_monitoring_settings(reason: impl Into<String>) -> Self {
        Self::InvalidMonitoringSettings {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
