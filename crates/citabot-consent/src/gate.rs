// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The consent gate itself.
//!
//! Every inbound identity passes through [`ConsentGate::check`] before any
//! intent classification. A store failure is treated as "not granted":
//! availability is sacrificed for compliance correctness.

use std::sync::Arc;

use chrono::Utc;
use citabot_core::CitabotError;
use citabot_core::traits::ConsentStore;
use citabot_core::types::{ConsentRecord, ConsentType, Identity};
use tracing::{error, info};

pub struct ConsentGate {
    store: Arc<dyn ConsentStore>,
}

impl ConsentGate {
    pub fn new(store: Arc<dyn ConsentStore>) -> Self {
        Self { store }
    }

    /// Whether the identity currently has a grant for the consent type.
    ///
    /// Returns false both when no grant exists and when the store is
    /// unreachable (fail closed).
    pub async fn check(&self, identity: &Identity, consent_type: ConsentType) -> bool {
        match self.store.latest(identity, consent_type).await {
            Ok(Some(record)) => record.granted,
            Ok(None) => false,
            Err(e) => {
                error!(identity = %identity, error = %e, "consent store unreachable, failing closed");
                false
            }
        }
    }

    /// Appends a consent event to the ledger.
    pub async fn record(
        &self,
        identity: &Identity,
        consent_type: ConsentType,
        granted: bool,
        purpose: Option<&str>,
        channel: &str,
    ) -> Result<(), CitabotError> {
        let record = ConsentRecord {
            identity: identity.clone(),
            consent_type,
            granted,
            recorded_at: Utc::now(),
            purpose: purpose.map(|s| s.to_string()),
            channel: channel.to_string(),
        };
        self.store.append(&record).await?;
        info!(identity = %identity, ?consent_type, granted, "consent recorded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory ledger; `fail` makes every call error to exercise the
    /// fail-closed path.
    #[derive(Default)]
    struct MemoryConsentStore {
        records: Mutex<Vec<ConsentRecord>>,
        fail: bool,
    }

    #[async_trait]
    impl ConsentStore for MemoryConsentStore {
        async fn latest(
            &self,
            identity: &Identity,
            consent_type: ConsentType,
        ) -> Result<Option<ConsentRecord>, CitabotError> {
            if self.fail {
                return Err(CitabotError::Internal("store down".into()));
            }
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|r| &r.identity == identity && r.consent_type == consent_type)
                .last()
                .cloned())
        }

        async fn append(&self, record: &ConsentRecord) -> Result<(), CitabotError> {
            if self.fail {
                return Err(CitabotError::Internal("store down".into()));
            }
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    fn identity() -> Identity {
        Identity::normalize("+34600111222")
    }

    #[tokio::test]
    async fn unknown_identity_is_not_granted() {
        let gate = ConsentGate::new(Arc::new(MemoryConsentStore::default()));
        assert!(!gate.check(&identity(), ConsentType::ChannelCommunication).await);
    }

    #[tokio::test]
    async fn grant_then_withdraw_is_not_granted() {
        let gate = ConsentGate::new(Arc::new(MemoryConsentStore::default()));
        let id = identity();

        gate.record(&id, ConsentType::ChannelCommunication, true, None, "whatsapp")
            .await
            .unwrap();
        assert!(gate.check(&id, ConsentType::ChannelCommunication).await);

        gate.record(&id, ConsentType::ChannelCommunication, false, None, "whatsapp")
            .await
            .unwrap();
        assert!(!gate.check(&id, ConsentType::ChannelCommunication).await);
    }

    #[tokio::test]
    async fn store_failure_fails_closed() {
        let store = MemoryConsentStore {
            fail: true,
            ..Default::default()
        };
        let gate = ConsentGate::new(Arc::new(store));
        assert!(!gate.check(&identity(), ConsentType::ChannelCommunication).await);
    }
}
