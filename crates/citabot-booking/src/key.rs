// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Booking intent key derivation.
//!
//! The key collapses duplicate side-effecting attempts: the same identity
//! asking for the same service at the same start time yields the same key,
//! no matter how the request was phrased or how many times the transport
//! delivered it.

use chrono::{DateTime, Timelike, Utc};
use citabot_core::types::Identity;
use sha2::{Digest, Sha256};

/// Deterministic idempotency key for one booking intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingIntentKey(String);

impl BookingIntentKey {
    /// Derives the key from (identity, service, start), with the start
    /// normalized to UTC minute precision so sub-minute jitter between
    /// retries cannot split the key.
    pub fn derive(identity: &Identity, service: &str, start: DateTime<Utc>) -> Self {
        let normalized_start = start
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(start);
        let material = format!(
            "{}|{}|{}",
            identity.as_str(),
            service.trim().to_lowercase(),
            normalized_start.to_rfc3339()
        );
        let digest = Sha256::digest(material.as_bytes());
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookingIntentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
