// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The booking orchestrator.
//!
//! Ordering invariant: the external scheduling event is created BEFORE the
//! local row is persisted. A crash between the two leaves an external
//! event without a local record, which the salon can see and honor; the
//! reverse (a local "confirmed" booking the salon never sees) is the
//! failure mode this ordering exists to prevent.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use citabot_core::CitabotError;
use citabot_core::traits::{BookingStore, ClientDirectory, EventAttendee, SchedulingAdapter};
use citabot_core::types::{
    Booking, BookingStatus, ConversationContext, Reminder, ReminderStatus,
};
use tracing::{error, info, warn};

use crate::key::BookingIntentKey;

/// Result of one booking attempt.
#[derive(Debug, Clone)]
pub enum BookingOutcome {
    Confirmed { booking: Booking },
    /// The requested slot is taken; `alternatives` are free start times
    /// for the response layer to offer.
    NoAvailability { alternatives: Vec<DateTime<Utc>> },
    /// The scheduling service failed. Not retried within the turn; the
    /// raw reason feeds the operator notification path.
    Failed { reason: String },
}

/// Per-service duration lookup plus the orchestration tunables.
pub struct BookingOrchestrator {
    scheduler: Arc<dyn SchedulingAdapter>,
    bookings: Arc<dyn BookingStore>,
    clients: Arc<dyn ClientDirectory>,
    services: Vec<citabot_config::ServiceConfig>,
    lookback: Duration,
    alternatives_window: Duration,
    reminder_offsets: Vec<i64>,
    scheduling_timeout: StdDuration,
    source: String,
}

/// Cap on alternatives returned to the response layer; more than a
/// handful is unreadable in a chat message.
const MAX_ALTERNATIVES: usize = 5;

impl BookingOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        scheduler: Arc<dyn SchedulingAdapter>,
        bookings: Arc<dyn BookingStore>,
        clients: Arc<dyn ClientDirectory>,
        services: Vec<citabot_config::ServiceConfig>,
        lookback: Duration,
        alternatives_window: Duration,
        reminder_offsets: Vec<i64>,
        scheduling_timeout: StdDuration,
        source: String,
    ) -> Self {
        Self {
            scheduler,
            bookings,
            clients,
            services,
            lookback,
            alternatives_window,
            reminder_offsets,
            scheduling_timeout,
            source,
        }
    }

    fn service_duration(&self, service: &str) -> Option<Duration> {
        self.services
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(service))
            .map(|s| Duration::minutes(i64::from(s.duration_minutes)))
    }

    /// Attempts to book the appointment described by the context's slots.
    ///
    /// Storage errors propagate as `Err`; scheduling-vendor errors are
    /// normal outcomes and come back as [`BookingOutcome::Failed`].
    pub async fn attempt(
        &self,
        context: &ConversationContext,
    ) -> Result<BookingOutcome, CitabotError> {
        let slots = &context.slots;
        let (service, date, time, client_name) = match (
            slots.service.as_deref(),
            slots.date,
            slots.time,
            slots.client_name.as_deref(),
        ) {
            (Some(s), Some(d), Some(t), Some(n)) => (s, d, t, n),
            _ => {
                return Err(CitabotError::Internal(
                    "booking attempted with incomplete slots".into(),
                ));
            }
        };

        let duration = self.service_duration(service).ok_or_else(|| {
            CitabotError::Internal(format!("service {service} missing from catalog"))
        })?;
        let start = date.and_time(time).and_utc();
        let identity = &context.identity;
        let key = BookingIntentKey::derive(identity, service, start);
        let now = Utc::now();

        // Idempotent short-circuit: the primary defense against duplicate
        // transport delivery.
        if let Some(existing) = self
            .bookings
            .find_by_intent_key(key.as_str(), now - self.lookback)
            .await?
        {
            info!(
                identity = %identity,
                booking_id = %existing.id,
                "duplicate booking intent, returning existing booking"
            );
            return Ok(BookingOutcome::Confirmed { booking: existing });
        }

        let available = match tokio::time::timeout(
            self.scheduling_timeout,
            self.scheduler.check_availability(service, start, duration),
        )
        .await
        {
            Ok(Ok(available)) => available,
            Ok(Err(e)) => {
                warn!(identity = %identity, error = %e, "availability check failed");
                return Ok(BookingOutcome::Failed {
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                warn!(identity = %identity, "availability check timed out");
                return Ok(BookingOutcome::Failed {
                    reason: "scheduling service timed out".into(),
                });
            }
        };

        if !available {
            return Ok(BookingOutcome::NoAvailability {
                alternatives: self.alternatives_around(service, start, now).await,
            });
        }

        let attendee = EventAttendee {
            name: client_name.to_string(),
            email: slots.contact_email.clone(),
            address: identity.as_str().to_string(),
        };
        let external_ref = match tokio::time::timeout(
            self.scheduling_timeout,
            self.scheduler.create_event(service, start, duration, &attendee),
        )
        .await
        {
            Ok(Ok(external_ref)) => external_ref,
            Ok(Err(e)) => {
                warn!(identity = %identity, error = %e, "event creation failed");
                return Ok(BookingOutcome::Failed {
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                // The vendor may or may not have created the event; do not
                // retry the mutation blindly, that risks double-booking.
                warn!(identity = %identity, "event creation timed out");
                return Ok(BookingOutcome::Failed {
                    reason: "scheduling service timed out during event creation".into(),
                });
            }
        };

        // External confirmation is in hand; everything from here on is
        // local and safe to keep.
        let client = self
            .clients
            .find_or_create(identity, Some(client_name))
            .await?;
        let booking = Booking {
            id: uuid::Uuid::new_v4().to_string(),
            client_id: client.id,
            identity: identity.clone(),
            service: service.to_string(),
            starts_at: start,
            ends_at: start + duration,
            status: BookingStatus::Confirmed,
            external_ref: Some(external_ref),
            source: self.source.clone(),
            idempotency_key: key.as_str().to_string(),
            created_at: now,
        };
        self.bookings.insert(&booking).await?;
        info!(
            identity = %identity,
            booking_id = %booking.id,
            service,
            starts_at = %booking.starts_at,
            "booking confirmed"
        );

        self.schedule_reminders(&booking, now).await;

        Ok(BookingOutcome::Confirmed { booking })
    }

    /// Cancels the booking: external event first, then local status and
    /// reminder cleanup.
    pub async fn cancel(&self, booking: &Booking) -> Result<(), CitabotError> {
        if let Some(ref external_ref) = booking.external_ref {
            match tokio::time::timeout(
                self.scheduling_timeout,
                self.scheduler.cancel_event(external_ref),
            )
            .await
            {
                Ok(result) => result?,
                Err(_) => {
                    return Err(CitabotError::Scheduling {
                        message: "scheduling service timed out during cancellation".into(),
                        source: None,
                    });
                }
            }
        }
        self.bookings
            .update_status(&booking.id, BookingStatus::Cancelled)
            .await?;
        self.bookings.cancel_reminders(&booking.id).await?;
        info!(booking_id = %booking.id, "booking cancelled");
        Ok(())
    }

    async fn alternatives_around(
        &self,
        service: &str,
        start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Vec<DateTime<Utc>> {
        let from = (start - self.alternatives_window).max(now);
        let result = tokio::time::timeout(
            self.scheduling_timeout,
            self.scheduler
                .list_alternatives(service, from, self.alternatives_window * 2),
        )
        .await;

        match result {
            Ok(Ok(mut slots)) => {
                slots.retain(|s| *s >= now);
                slots.truncate(MAX_ALTERNATIVES);
                slots
            }
            Ok(Err(e)) => {
                warn!(error = %e, "alternatives query failed, offering none");
                Vec::new()
            }
            Err(_) => {
                warn!("alternatives query timed out, offering none");
                Vec::new()
            }
        }
    }

    /// Reminder failures are logged, never propagated: the booking's
    /// validity must not depend on reminder infrastructure.
    async fn schedule_reminders(&self, booking: &Booking, now: DateTime<Utc>) {
        let reminders: Vec<Reminder> = self
            .reminder_offsets
            .iter()
            .map(|offset| booking.starts_at - Duration::minutes(*offset))
            .filter(|due_at| *due_at > now)
            .map(|due_at| Reminder {
                id: uuid::Uuid::new_v4().to_string(),
                booking_id: booking.id.clone(),
                due_at,
                status: ReminderStatus::Pending,
            })
            .collect();

        if reminders.is_empty() {
            return;
        }
        if let Err(e) = self.bookings.insert_reminders(&reminders).await {
            error!(
                booking_id = %booking.id,
                error = %e,
                "reminder scheduling failed, booking remains valid"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveTime;
    use citabot_core::types::{ClientRef, Identity};
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubScheduler {
        available: bool,
        fail: bool,
        alternatives: Vec<DateTime<Utc>>,
        /// Ordered log of calls, shared with the store to assert the
        /// external-before-local invariant.
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl SchedulingAdapter for StubScheduler {
        async fn check_availability(
            &self,
            _service: &str,
            _start: DateTime<Utc>,
            _duration: Duration,
        ) -> Result<bool, CitabotError> {
            if self.fail {
                return Err(CitabotError::Scheduling {
                    message: "vendor 500".into(),
                    source: None,
                });
            }
            Ok(self.available)
        }

        async fn create_event(
            &self,
            _service: &str,
            _start: DateTime<Utc>,
            _duration: Duration,
            _attendee: &EventAttendee,
        ) -> Result<String, CitabotError> {
            self.log.lock().unwrap().push("create_event");
            Ok("evt-123".into())
        }

        async fn list_alternatives(
            &self,
            _service: &str,
            _from: DateTime<Utc>,
            _window: Duration,
        ) -> Result<Vec<DateTime<Utc>>, CitabotError> {
            Ok(self.alternatives.clone())
        }

        async fn cancel_event(&self, _external_ref: &str) -> Result<(), CitabotError> {
            self.log.lock().unwrap().push("cancel_event");
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        bookings: Mutex<Vec<Booking>>,
        reminders: Mutex<Vec<Reminder>>,
        fail_reminders: bool,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl BookingStore for MemoryStore {
        async fn find_by_intent_key(
            &self,
            key: &str,
            since: DateTime<Utc>,
        ) -> Result<Option<Booking>, CitabotError> {
            Ok(self
                .bookings
                .lock()
                .unwrap()
                .iter()
                .filter(|b| {
                    b.idempotency_key == key
                        && b.created_at >= since
                        && matches!(b.status, BookingStatus::Pending | BookingStatus::Confirmed)
                })
                .last()
                .cloned())
        }

        async fn insert(&self, booking: &Booking) -> Result<(), CitabotError> {
            self.log.lock().unwrap().push("insert_booking");
            self.bookings.lock().unwrap().push(booking.clone());
            Ok(())
        }

        async fn update_status(
            &self,
            id: &str,
            status: BookingStatus,
        ) -> Result<(), CitabotError> {
            for b in self.bookings.lock().unwrap().iter_mut() {
                if b.id == id {
                    b.status = status;
                }
            }
            Ok(())
        }

        async fn find_active_for_identity(
            &self,
            identity: &Identity,
        ) -> Result<Option<Booking>, CitabotError> {
            Ok(self
                .bookings
                .lock()
                .unwrap()
                .iter()
                .find(|b| {
                    &b.identity == identity
                        && matches!(b.status, BookingStatus::Pending | BookingStatus::Confirmed)
                })
                .cloned())
        }

        async fn insert_reminders(&self, reminders: &[Reminder]) -> Result<(), CitabotError> {
            if self.fail_reminders {
                return Err(CitabotError::Internal("reminder table down".into()));
            }
            self.reminders.lock().unwrap().extend_from_slice(reminders);
            Ok(())
        }

        async fn cancel_reminders(&self, booking_id: &str) -> Result<(), CitabotError> {
            for r in self.reminders.lock().unwrap().iter_mut() {
                if r.booking_id == booking_id {
                    r.status = ReminderStatus::Cancelled;
                }
            }
            Ok(())
        }
    }

    struct StubDirectory;

    #[async_trait]
    impl ClientDirectory for StubDirectory {
        async fn find_or_create(
            &self,
            _identity: &Identity,
            display_name: Option<&str>,
        ) -> Result<ClientRef, CitabotError> {
            Ok(ClientRef {
                id: "client-1".into(),
                display_name: display_name.map(|s| s.to_string()),
            })
        }
    }

    fn services() -> Vec<citabot_config::ServiceConfig> {
        vec![citabot_config::ServiceConfig {
            name: "corte".into(),
            duration_minutes: 30,
            aliases: vec![],
        }]
    }

    fn ready_context() -> ConversationContext {
        let mut ctx = ConversationContext::new(
            Identity::normalize("+34600111222"),
            Duration::minutes(30),
        );
        ctx.slots.service = Some("corte".into());
        // Far enough in the future that reminder offsets stay ahead of now.
        ctx.slots.date = Some(Utc::now().date_naive() + Duration::days(10));
        ctx.slots.time = NaiveTime::from_hms_opt(10, 0, 0);
        ctx.slots.client_name = Some("Ana".into());
        ctx
    }

    fn orchestrator(
        scheduler: StubScheduler,
        store: MemoryStore,
    ) -> (BookingOrchestrator, Arc<MemoryStore>) {
        let store = Arc::new(store);
        let orchestrator = BookingOrchestrator::new(
            Arc::new(scheduler),
            Arc::clone(&store) as Arc<dyn BookingStore>,
            Arc::new(StubDirectory),
            services(),
            Duration::hours(24),
            Duration::days(7),
            vec![1440, 120, 30],
            StdDuration::from_secs(10),
            "whatsapp".into(),
        );
        (orchestrator, store)
    }

    #[tokio::test]
    async fn available_slot_books_and_schedules_reminders() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let scheduler = StubScheduler {
            available: true,
            log: Arc::clone(&log),
            ..Default::default()
        };
        let store = MemoryStore {
            log: Arc::clone(&log),
            ..Default::default()
        };
        let (orchestrator, store) = orchestrator(scheduler, store);

        let outcome = orchestrator.attempt(&ready_context()).await.unwrap();
        let booking = match outcome {
            BookingOutcome::Confirmed { booking } => booking,
            other => panic!("expected Confirmed, got {other:?}"),
        };

        assert_eq!(booking.external_ref.as_deref(), Some("evt-123"));
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(store.reminders.lock().unwrap().len(), 3);
        // External event strictly before local persist.
        assert_eq!(*log.lock().unwrap(), vec!["create_event", "insert_booking"]);
    }

    #[tokio::test]
    async fn duplicate_intent_returns_existing_booking_without_side_effects() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let scheduler = StubScheduler {
            available: true,
            log: Arc::clone(&log),
            ..Default::default()
        };
        let store = MemoryStore {
            log: Arc::clone(&log),
            ..Default::default()
        };
        let (orchestrator, store) = orchestrator(scheduler, store);
        let ctx = ready_context();

        let first = orchestrator.attempt(&ctx).await.unwrap();
        let second = orchestrator.attempt(&ctx).await.unwrap();

        let (a, b) = match (first, second) {
            (
                BookingOutcome::Confirmed { booking: a },
                BookingOutcome::Confirmed { booking: b },
            ) => (a, b),
            other => panic!("expected two confirmations, got {other:?}"),
        };
        assert_eq!(a.id, b.id);
        assert_eq!(store.bookings.lock().unwrap().len(), 1);
        // Only the first attempt touched the scheduler.
        assert_eq!(
            log.lock()
                .unwrap()
                .iter()
                .filter(|e| **e == "create_event")
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn unavailable_slot_returns_alternatives_and_no_booking() {
        let alternatives = vec![
            Utc::now() + Duration::days(11),
            Utc::now() + Duration::days(12),
        ];
        let scheduler = StubScheduler {
            available: false,
            alternatives: alternatives.clone(),
            ..Default::default()
        };
        let (orchestrator, store) = orchestrator(scheduler, MemoryStore::default());

        let outcome = orchestrator.attempt(&ready_context()).await.unwrap();
        match outcome {
            BookingOutcome::NoAvailability { alternatives: got } => {
                assert_eq!(got.len(), 2);
            }
            other => panic!("expected NoAvailability, got {other:?}"),
        }
        assert!(store.bookings.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn alternatives_are_capped_and_past_slots_dropped() {
        let mut alternatives = vec![Utc::now() - Duration::days(1)];
        for day in 1..10 {
            alternatives.push(Utc::now() + Duration::days(day));
        }
        let scheduler = StubScheduler {
            available: false,
            alternatives,
            ..Default::default()
        };
        let (orchestrator, _store) = orchestrator(scheduler, MemoryStore::default());

        let outcome = orchestrator.attempt(&ready_context()).await.unwrap();
        match outcome {
            BookingOutcome::NoAvailability { alternatives } => {
                assert_eq!(alternatives.len(), MAX_ALTERNATIVES);
                assert!(alternatives.iter().all(|s| *s > Utc::now() - Duration::minutes(1)));
            }
            other => panic!("expected NoAvailability, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn vendor_failure_surfaces_as_failed_with_reason() {
        let scheduler = StubScheduler {
            fail: true,
            ..Default::default()
        };
        let (orchestrator, store) = orchestrator(scheduler, MemoryStore::default());

        let outcome = orchestrator.attempt(&ready_context()).await.unwrap();
        match outcome {
            BookingOutcome::Failed { reason } => assert!(reason.contains("vendor 500")),
            other => panic!("expected Failed, got {other:?}"),
        }
        assert!(store.bookings.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn reminder_failure_does_not_roll_back_booking() {
        let scheduler = StubScheduler {
            available: true,
            ..Default::default()
        };
        let store = MemoryStore {
            fail_reminders: true,
            ..Default::default()
        };
        let (orchestrator, store) = orchestrator(scheduler, store);

        let outcome = orchestrator.attempt(&ready_context()).await.unwrap();
        assert!(matches!(outcome, BookingOutcome::Confirmed { .. }));
        assert_eq!(store.bookings.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn incomplete_slots_are_an_internal_error() {
        let (orchestrator, _store) =
            orchestrator(StubScheduler::default(), MemoryStore::default());
        let mut ctx = ready_context();
        ctx.slots.client_name = None;

        assert!(orchestrator.attempt(&ctx).await.is_err());
    }

    #[tokio::test]
    async fn cancel_transitions_status_and_reminders() {
        let scheduler = StubScheduler {
            available: true,
            ..Default::default()
        };
        let (orchestrator, store) = orchestrator(scheduler, MemoryStore::default());

        let booking = match orchestrator.attempt(&ready_context()).await.unwrap() {
            BookingOutcome::Confirmed { booking } => booking,
            other => panic!("expected Confirmed, got {other:?}"),
        };
        orchestrator.cancel(&booking).await.unwrap();

        assert_eq!(
            store.bookings.lock().unwrap()[0].status,
            BookingStatus::Cancelled
        );
        assert!(
            store
                .reminders
                .lock()
                .unwrap()
                .iter()
                .all(|r| r.status == ReminderStatus::Cancelled)
        );

        // The slot can be rebooked after cancellation.
        let outcome = orchestrator.attempt(&ready_context()).await.unwrap();
        match outcome {
            BookingOutcome::Confirmed { booking: rebooked } => {
                assert_ne!(rebooked.id, booking.id)
            }
            other => panic!("expected Confirmed, got {other:?}"),
        }
    }
}
