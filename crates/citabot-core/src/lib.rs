// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Citabot booking assistant.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Citabot workspace. The messaging
//! transport, language-understanding service, scheduling vendor, and
//! durable store are all collaborators behind traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CitabotError;
pub use types::{Identity, InboundMessage, OutboundMessage};

// Re-export all adapter traits at crate root.
pub use traits::{
    BookingStore, ChannelAdapter, ClientDirectory, ConsentStore, LanguageProvider,
    SchedulingAdapter, SuppressionList,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_construct() {
        let _config = CitabotError::Config("test".into());
        let _storage = CitabotError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _channel = CitabotError::Channel {
            message: "test".into(),
            source: None,
        };
        let _provider = CitabotError::Provider {
            message: "test".into(),
            source: None,
        };
        let _scheduling = CitabotError::Scheduling {
            message: "test".into(),
            source: None,
        };
        let _timeout = CitabotError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = CitabotError::Internal("test".into());
    }

    #[test]
    fn all_trait_modules_are_exported() {
        // Compile-time check that every collaborator seam is reachable
        // through the public API.
        fn _assert_channel_adapter<T: ChannelAdapter>() {}
        fn _assert_language_provider<T: LanguageProvider>() {}
        fn _assert_scheduling_adapter<T: SchedulingAdapter>() {}
        fn _assert_consent_store<T: ConsentStore>() {}
        fn _assert_booking_store<T: BookingStore>() {}
        fn _assert_client_directory<T: ClientDirectory>() {}
        fn _assert_suppression_list<T: SuppressionList>() {}
    }

    #[test]
    fn send_error_converts_into_channel_error() {
        let send_err = types::SendError {
            code: Some(21610),
            message: "blocked".into(),
        };
        let err: CitabotError = send_err.into();
        assert!(matches!(err, CitabotError::Channel { .. }));
    }
}
