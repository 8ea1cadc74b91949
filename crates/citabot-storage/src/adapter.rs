// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `SqliteStore`: the concrete durable store behind the core storage traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use citabot_core::CitabotError;
use citabot_core::traits::{BookingStore, ClientDirectory, ConsentStore, SuppressionList};
use citabot_core::types::{
    Booking, BookingStatus, ClientRef, ConsentRecord, ConsentType, Identity, Reminder,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed implementation of every durable-store trait.
///
/// Clones share the single background writer connection.
#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Opens the database at `path`, running migrations.
    pub async fn open(path: &str) -> Result<Self, CitabotError> {
        Ok(Self::new(Database::open(path).await?))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl ConsentStore for SqliteStore {
    async fn latest(
        &self,
        identity: &Identity,
        consent_type: ConsentType,
    ) -> Result<Option<ConsentRecord>, CitabotError> {
        queries::consents::latest(&self.db, identity, consent_type).await
    }

    async fn append(&self, record: &ConsentRecord) -> Result<(), CitabotError> {
        queries::consents::append(&self.db, record).await
    }
}

#[async_trait]
impl BookingStore for SqliteStore {
    async fn find_by_intent_key(
        &self,
        key: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<Booking>, CitabotError> {
        queries::bookings::find_by_intent_key(&self.db, key, since).await
    }

    async fn insert(&self, booking: &Booking) -> Result<(), CitabotError> {
        queries::bookings::insert(&self.db, booking).await
    }

    async fn update_status(&self, id: &str, status: BookingStatus) -> Result<(), CitabotError> {
        queries::bookings::update_status(&self.db, id, status).await
    }

    async fn find_active_for_identity(
        &self,
        identity: &Identity,
    ) -> Result<Option<Booking>, CitabotError> {
        queries::bookings::find_active_for_identity(&self.db, identity).await
    }

    async fn insert_reminders(&self, reminders: &[Reminder]) -> Result<(), CitabotError> {
        queries::bookings::insert_reminders(&self.db, reminders).await
    }

    async fn cancel_reminders(&self, booking_id: &str) -> Result<(), CitabotError> {
        queries::bookings::cancel_reminders(&self.db, booking_id).await
    }
}

#[async_trait]
impl ClientDirectory for SqliteStore {
    async fn find_or_create(
        &self,
        identity: &Identity,
        display_name: Option<&str>,
    ) -> Result<ClientRef, CitabotError> {
        queries::clients::find_or_create(&self.db, identity, display_name).await
    }
}

#[async_trait]
impl SuppressionList for SqliteStore {
    async fn is_suppressed(&self, identity: &Identity) -> Result<bool, CitabotError> {
        queries::suppressions::is_suppressed(&self.db, identity).await
    }

    async fn suppress(&self, identity: &Identity, reason: &str) -> Result<(), CitabotError> {
        queries::suppressions::suppress(&self.db, identity, reason).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn store_round_trips_through_trait_objects() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("test.db").to_str().unwrap())
            .await
            .unwrap();

        let consents: &dyn ConsentStore = &store;
        let identity = Identity::normalize("+34600111222");
        let record = ConsentRecord {
            identity: identity.clone(),
            consent_type: ConsentType::ChannelCommunication,
            granted: true,
            recorded_at: Utc::now(),
            purpose: None,
            channel: "whatsapp".to_string(),
        };
        consents.append(&record).await.unwrap();
        let latest = consents
            .latest(&identity, ConsentType::ChannelCommunication)
            .await
            .unwrap()
            .unwrap();
        assert!(latest.granted);

        let directory: &dyn ClientDirectory = &store;
        let client = directory.find_or_create(&identity, Some("Ana")).await.unwrap();
        assert_eq!(client.display_name.as_deref(), Some("Ana"));
    }
}
