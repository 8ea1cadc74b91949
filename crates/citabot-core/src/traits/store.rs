// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable-store traits for consent, bookings, clients, and suppressions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::CitabotError;
use crate::types::{
    Booking, BookingStatus, ClientRef, ConsentRecord, ConsentType, Identity, Reminder,
};

/// Append-only consent ledger. The latest record per (identity, type) is
/// authoritative; rows are never mutated in place.
#[async_trait]
pub trait ConsentStore: Send + Sync {
    async fn latest(
        &self,
        identity: &Identity,
        consent_type: ConsentType,
    ) -> Result<Option<ConsentRecord>, CitabotError>;

    async fn append(&self, record: &ConsentRecord) -> Result<(), CitabotError>;
}

/// Booking persistence plus the idempotency-key lookup that defends
/// against duplicate delivery.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Finds a committed booking for the idempotency key created at or
    /// after `since` (the lookback window boundary).
    async fn find_by_intent_key(
        &self,
        key: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<Booking>, CitabotError>;

    async fn insert(&self, booking: &Booking) -> Result<(), CitabotError>;

    async fn update_status(&self, id: &str, status: BookingStatus) -> Result<(), CitabotError>;

    async fn find_active_for_identity(
        &self,
        identity: &Identity,
    ) -> Result<Option<Booking>, CitabotError>;

    async fn insert_reminders(&self, reminders: &[Reminder]) -> Result<(), CitabotError>;

    async fn cancel_reminders(&self, booking_id: &str) -> Result<(), CitabotError>;
}

/// Find-or-create directory of client records keyed by normalized address.
#[async_trait]
pub trait ClientDirectory: Send + Sync {
    async fn find_or_create(
        &self,
        identity: &Identity,
        display_name: Option<&str>,
    ) -> Result<ClientRef, CitabotError>;
}

/// Persisted outbound suppression list.
///
/// RECIPIENT-class delivery failures mark an address here so future turns
/// do not keep retrying a doomed send.
#[async_trait]
pub trait SuppressionList: Send + Sync {
    async fn is_suppressed(&self, identity: &Identity) -> Result<bool, CitabotError>;

    async fn suppress(&self, identity: &Identity, reason: &str) -> Result<(), CitabotError>;
}
