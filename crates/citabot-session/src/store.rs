// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory conversation context store with a sliding TTL.
//!
//! Contexts are ephemeral by design: a crash loses at most the current
//! slot-filling progress, never a committed booking.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use citabot_core::CitabotError;
use citabot_core::types::{ConversationContext, Identity};
use dashmap::DashMap;
use tracing::debug;

/// Conversation context persistence for the dialogue engine.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the live context for an identity. Expired contexts are
    /// discarded on load and reported as absent.
    async fn load(&self, identity: &Identity) -> Result<Option<ConversationContext>, CitabotError>;

    /// Saves the context, refreshing its sliding TTL.
    async fn save(&self, context: ConversationContext) -> Result<(), CitabotError>;

    /// Drops the context (after a completed booking or a withdrawal).
    async fn clear(&self, identity: &Identity) -> Result<(), CitabotError>;
}

/// DashMap-backed [`SessionStore`].
pub struct InMemorySessionStore {
    sessions: DashMap<String, ConversationContext>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Removes every expired context, returning how many were dropped.
    /// Called periodically so abandoned conversations do not accumulate.
    pub fn sweep(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, ctx| !ctx.is_expired(now));
        let dropped = before - self.sessions.len();
        if dropped > 0 {
            debug!(dropped, "swept expired conversation contexts");
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, identity: &Identity) -> Result<Option<ConversationContext>, CitabotError> {
        let key = identity.as_str();
        if let Some(ctx) = self.sessions.get(key) {
            if !ctx.is_expired(Utc::now()) {
                return Ok(Some(ctx.clone()));
            }
        } else {
            return Ok(None);
        }
        // Expired: drop it so the next turn starts fresh.
        self.sessions.remove(key);
        Ok(None)
    }

    async fn save(&self, mut context: ConversationContext) -> Result<(), CitabotError> {
        context.touch(self.ttl);
        self.sessions
            .insert(context.identity.as_str().to_string(), context);
        Ok(())
    }

    async fn clear(&self, identity: &Identity) -> Result<(), CitabotError> {
        self.sessions.remove(identity.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity::normalize("+34600111222")
    }

    #[tokio::test]
    async fn load_missing_returns_none() {
        let store = InMemorySessionStore::new(Duration::minutes(30));
        assert!(store.load(&identity()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = InMemorySessionStore::new(Duration::minutes(30));
        let id = identity();
        let mut ctx = ConversationContext::new(id.clone(), Duration::minutes(30));
        ctx.slots.service = Some("corte".to_string());
        store.save(ctx).await.unwrap();

        let loaded = store.load(&id).await.unwrap().unwrap();
        assert_eq!(loaded.slots.service.as_deref(), Some("corte"));
    }

    #[tokio::test]
    async fn expired_context_is_discarded_on_load() {
        // TTL of zero means the context is expired the moment it is saved.
        let store = InMemorySessionStore::new(Duration::zero());
        let id = identity();
        store
            .save(ConversationContext::new(id.clone(), Duration::zero()))
            .await
            .unwrap();

        assert!(store.load(&id).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn clear_drops_context() {
        let store = InMemorySessionStore::new(Duration::minutes(30));
        let id = identity();
        store
            .save(ConversationContext::new(id.clone(), Duration::minutes(30)))
            .await
            .unwrap();
        store.clear(&id).await.unwrap();
        assert!(store.load(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sweep_removes_only_expired() {
        let store = InMemorySessionStore::new(Duration::minutes(30));
        let live = ConversationContext::new(identity(), Duration::minutes(30));
        let dead = ConversationContext::new(
            Identity::normalize("+34600999888"),
            Duration::zero(),
        );
        store.save(live).await.unwrap();
        // Insert the dead one directly so save() does not refresh its TTL.
        store
            .sessions
            .insert(dead.identity.as_str().to_string(), dead);

        assert_eq!(store.sweep(), 1);
        assert_eq!(store.len(), 1);
    }
}
