// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock scheduling adapter with controllable availability.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use citabot_core::CitabotError;
use citabot_core::traits::{EventAttendee, SchedulingAdapter};

/// One event created through the mock, captured for assertions.
#[derive(Debug, Clone)]
pub struct CreatedEvent {
    pub external_ref: String,
    pub service: String,
    pub start: DateTime<Utc>,
    pub attendee_name: String,
}

/// Scripted [`SchedulingAdapter`].
pub struct MockScheduler {
    available: Arc<Mutex<bool>>,
    alternatives: Arc<Mutex<Vec<DateTime<Utc>>>>,
    fail: Arc<Mutex<bool>>,
    created: Arc<Mutex<Vec<CreatedEvent>>>,
    cancelled: Arc<Mutex<Vec<String>>>,
}

impl MockScheduler {
    pub fn new() -> Self {
        Self {
            available: Arc::new(Mutex::new(true)),
            alternatives: Arc::new(Mutex::new(Vec::new())),
            fail: Arc::new(Mutex::new(false)),
            created: Arc::new(Mutex::new(Vec::new())),
            cancelled: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn set_available(&self, available: bool) {
        *self.available.lock().await = available;
    }

    pub async fn set_alternatives(&self, alternatives: Vec<DateTime<Utc>>) {
        *self.alternatives.lock().await = alternatives;
    }

    /// Makes every subsequent call fail with a vendor error.
    pub async fn set_failing(&self, fail: bool) {
        *self.fail.lock().await = fail;
    }

    pub async fn created_events(&self) -> Vec<CreatedEvent> {
        self.created.lock().await.clone()
    }

    pub async fn cancelled_refs(&self) -> Vec<String> {
        self.cancelled.lock().await.clone()
    }

    async fn check_fail(&self) -> Result<(), CitabotError> {
        if *self.fail.lock().await {
            return Err(CitabotError::Scheduling {
                message: "mock scheduling failure".into(),
                source: None,
            });
        }
        Ok(())
    }
}

impl Default for MockScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SchedulingAdapter for MockScheduler {
    async fn check_availability(
        &self,
        _service: &str,
        _start: DateTime<Utc>,
        _duration: Duration,
    ) -> Result<bool, CitabotError> {
        self.check_fail().await?;
        Ok(*self.available.lock().await)
    }

    async fn create_event(
        &self,
        service: &str,
        start: DateTime<Utc>,
        _duration: Duration,
        attendee: &EventAttendee,
    ) -> Result<String, CitabotError> {
        self.check_fail().await?;
        let external_ref = format!("mock-evt-{}", uuid::Uuid::new_v4());
        self.created.lock().await.push(CreatedEvent {
            external_ref: external_ref.clone(),
            service: service.to_string(),
            start,
            attendee_name: attendee.name.clone(),
        });
        Ok(external_ref)
    }

    async fn list_alternatives(
        &self,
        _service: &str,
        _from: DateTime<Utc>,
        _window: Duration,
    ) -> Result<Vec<DateTime<Utc>>, CitabotError> {
        self.check_fail().await?;
        Ok(self.alternatives.lock().await.clone())
    }

    async fn cancel_event(&self, external_ref: &str) -> Result<(), CitabotError> {
        self.check_fail().await?;
        self.cancelled.lock().await.push(external_ref.to_string());
        Ok(())
    }
}
