// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process stand-in for the external scheduling vendor.
//!
//! Tracks booked intervals per service in memory so `citabot serve` works
//! end to end without vendor credentials. State does not survive a
//! restart; a real vendor adapter replaces this wholesale.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Timelike, Utc};
use citabot_core::CitabotError;
use citabot_core::traits::{EventAttendee, SchedulingAdapter};
use tokio::sync::Mutex;
use tracing::debug;

/// Opening hours used when proposing alternative start times.
const OPEN_HOUR: u32 = 9;
const CLOSE_HOUR: u32 = 19;

/// Most alternatives ever proposed for one request.
const MAX_PROPOSALS: usize = 8;

struct BookedSlot {
    service: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// Memory-backed [`SchedulingAdapter`], keyed by external event ref.
pub struct InProcessCalendar {
    slots: Mutex<HashMap<String, BookedSlot>>,
}

impl InProcessCalendar {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn overlaps(
        slots: &HashMap<String, BookedSlot>,
        service: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> bool {
        slots
            .values()
            .any(|s| s.service == service && s.start < end && start < s.end)
    }
}

#[async_trait]
impl SchedulingAdapter for InProcessCalendar {
    async fn check_availability(
        &self,
        service: &str,
        start: DateTime<Utc>,
        duration: Duration,
    ) -> Result<bool, CitabotError> {
        let slots = self.slots.lock().await;
        Ok(!Self::overlaps(&slots, service, start, start + duration))
    }

    async fn create_event(
        &self,
        service: &str,
        start: DateTime<Utc>,
        duration: Duration,
        attendee: &EventAttendee,
    ) -> Result<String, CitabotError> {
        let mut slots = self.slots.lock().await;
        let end = start + duration;
        if Self::overlaps(&slots, service, start, end) {
            return Err(CitabotError::Scheduling {
                message: "slot already taken".into(),
                source: None,
            });
        }
        let external_ref = uuid::Uuid::new_v4().to_string();
        debug!(external_ref = %external_ref, service, attendee = %attendee.name, "event created");
        slots.insert(
            external_ref.clone(),
            BookedSlot {
                service: service.to_string(),
                start,
                end,
            },
        );
        Ok(external_ref)
    }

    async fn list_alternatives(
        &self,
        service: &str,
        from: DateTime<Utc>,
        window: Duration,
    ) -> Result<Vec<DateTime<Utc>>, CitabotError> {
        let slots = self.slots.lock().await;
        let until = from + window;

        // Hour granularity is enough for proposing start times.
        let mut cursor = from
            .with_minute(0)
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(from)
            + Duration::hours(1);

        let mut proposals = Vec::new();
        while cursor < until && proposals.len() < MAX_PROPOSALS {
            let in_hours = (OPEN_HOUR..CLOSE_HOUR).contains(&cursor.hour());
            if in_hours && !Self::overlaps(&slots, service, cursor, cursor + Duration::hours(1)) {
                proposals.push(cursor);
            }
            cursor += Duration::hours(1);
        }
        Ok(proposals)
    }

    async fn cancel_event(&self, external_ref: &str) -> Result<(), CitabotError> {
        let mut slots = self.slots.lock().await;
        if slots.remove(external_ref).is_none() {
            debug!(external_ref, "cancel for unknown event ref, ignoring");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn attendee() -> EventAttendee {
        EventAttendee {
            name: "Ana".into(),
            email: None,
            address: "+34600111222".into(),
        }
    }

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 3, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn booked_interval_blocks_same_service_only() {
        let calendar = InProcessCalendar::new();
        calendar
            .create_event("corte", ts(10), Duration::minutes(30), &attendee())
            .await
            .unwrap();

        assert!(
            !calendar
                .check_availability("corte", ts(10), Duration::minutes(30))
                .await
                .unwrap()
        );
        // A different service runs on its own chair.
        assert!(
            calendar
                .check_availability("manicura", ts(10), Duration::minutes(30))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn cancel_frees_the_slot() {
        let calendar = InProcessCalendar::new();
        let external_ref = calendar
            .create_event("corte", ts(10), Duration::minutes(30), &attendee())
            .await
            .unwrap();
        calendar.cancel_event(&external_ref).await.unwrap();

        assert!(
            calendar
                .check_availability("corte", ts(10), Duration::minutes(30))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn alternatives_respect_opening_hours_and_bookings() {
        let calendar = InProcessCalendar::new();
        calendar
            .create_event("corte", ts(11), Duration::hours(1), &attendee())
            .await
            .unwrap();

        let proposals = calendar
            .list_alternatives("corte", ts(8), Duration::hours(12))
            .await
            .unwrap();

        assert!(!proposals.is_empty());
        assert!(proposals.len() <= MAX_PROPOSALS);
        for slot in &proposals {
            assert!((OPEN_HOUR..CLOSE_HOUR).contains(&slot.hour()));
            assert_ne!(*slot, ts(11), "booked hour must not be proposed");
        }
    }
}
