// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Citabot booking assistant.

use thiserror::Error;

/// The primary error type used across all Citabot adapter traits and core operations.
#[derive(Debug, Error)]
pub enum CitabotError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Messaging channel errors (connection failure, malformed inbound payloads).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Language-understanding provider errors (API failure, malformed output).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Scheduling service errors (availability lookup or event mutation failed).
    #[error("scheduling error: {message}")]
    Scheduling {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out at an external I/O boundary.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_render_messages() {
        let e = CitabotError::Config("bad key".into());
        assert_eq!(e.to_string(), "configuration error: bad key");

        let e = CitabotError::Scheduling {
            message: "calendar unreachable".into(),
            source: None,
        };
        assert_eq!(e.to_string(), "scheduling error: calendar unreachable");

        let e = CitabotError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        assert!(e.to_string().contains("30s"));
    }
}
