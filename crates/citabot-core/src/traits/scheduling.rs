// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduling service adapter trait (external calendar/booking vendor).

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::error::CitabotError;

/// Attendee details attached to a created calendar event.
#[derive(Debug, Clone)]
pub struct EventAttendee {
    pub name: String,
    pub email: Option<String>,
    /// Normalized channel address, for vendor-side contact matching.
    pub address: String,
}

/// Adapter for the external scheduling service.
///
/// The vendor is an unreliable collaborator with its own rate limits;
/// mutations are never retried blindly by callers.
#[async_trait]
pub trait SchedulingAdapter: Send + Sync {
    /// Returns whether the requested slot is free.
    async fn check_availability(
        &self,
        service: &str,
        start: DateTime<Utc>,
        duration: Duration,
    ) -> Result<bool, CitabotError>;

    /// Creates a calendar event and returns the vendor's event reference.
    async fn create_event(
        &self,
        service: &str,
        start: DateTime<Utc>,
        duration: Duration,
        attendee: &EventAttendee,
    ) -> Result<String, CitabotError>;

    /// Lists alternative free start times within `window` after `from`.
    async fn list_alternatives(
        &self,
        service: &str,
        from: DateTime<Utc>,
        window: Duration,
    ) -> Result<Vec<DateTime<Utc>>, CitabotError>;

    /// Cancels a previously created event.
    async fn cancel_event(&self, external_ref: &str) -> Result<(), CitabotError>;
}
