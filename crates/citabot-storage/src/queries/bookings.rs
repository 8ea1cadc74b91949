// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Booking and reminder persistence.
//!
//! Bookings are never deleted; cancellation is a status transition so the
//! record stays visible to duplicate detection and audits.

use chrono::{DateTime, Utc};
use citabot_core::CitabotError;
use citabot_core::types::{Booking, BookingStatus, Identity, Reminder};
use rusqlite::params;

use crate::database::{Database, parse_enum, parse_ts};

fn booking_from_row(row: &rusqlite::Row<'_>) -> Result<Booking, rusqlite::Error> {
    Ok(Booking {
        id: row.get(0)?,
        client_id: row.get(1)?,
        identity: Identity(row.get(2)?),
        service: row.get(3)?,
        starts_at: parse_ts(4, row.get(4)?)?,
        ends_at: parse_ts(5, row.get(5)?)?,
        status: parse_enum(6, row.get(6)?)?,
        external_ref: row.get(7)?,
        source: row.get(8)?,
        idempotency_key: row.get(9)?,
        created_at: parse_ts(10, row.get(10)?)?,
    })
}

const BOOKING_COLUMNS: &str = "id, client_id, identity, service, starts_at, ends_at, \
     status, external_ref, source, idempotency_key, created_at";

/// Most recent live booking with the given intent key created since `since`.
///
/// Cancelled and failed bookings are ignored so the slot can be rebooked.
pub async fn find_by_intent_key(
    db: &Database,
    key: &str,
    since: DateTime<Utc>,
) -> Result<Option<Booking>, CitabotError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!(
                    "SELECT {BOOKING_COLUMNS} FROM bookings
                     WHERE idempotency_key = ?1
                       AND status IN ('pending', 'confirmed')
                       AND created_at >= ?2
                     ORDER BY created_at DESC LIMIT 1"
                ),
                params![key, since.to_rfc3339()],
                booking_from_row,
            );
            match result {
                Ok(booking) => Ok(Some(booking)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Persist a booking row. The external event must already exist; the
/// `external_ref` links back to it.
pub async fn insert(db: &Database, booking: &Booking) -> Result<(), CitabotError> {
    let booking = booking.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO bookings (id, client_id, identity, service, starts_at, ends_at,
                    status, external_ref, source, idempotency_key, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    booking.id,
                    booking.client_id,
                    booking.identity.as_str(),
                    booking.service,
                    booking.starts_at.to_rfc3339(),
                    booking.ends_at.to_rfc3339(),
                    booking.status.to_string(),
                    booking.external_ref,
                    booking.source,
                    booking.idempotency_key,
                    booking.created_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn update_status(
    db: &Database,
    booking_id: &str,
    status: BookingStatus,
) -> Result<(), CitabotError> {
    let booking_id = booking_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE bookings SET status = ?1 WHERE id = ?2",
                params![status.to_string(), booking_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Next upcoming pending or confirmed booking for an identity, if any.
/// Used to resolve "cancel my appointment" without asking which one.
pub async fn find_active_for_identity(
    db: &Database,
    identity: &Identity,
) -> Result<Option<Booking>, CitabotError> {
    let address = identity.as_str().to_string();
    let now = Utc::now().to_rfc3339();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!(
                    "SELECT {BOOKING_COLUMNS} FROM bookings
                     WHERE identity = ?1
                       AND status IN ('pending', 'confirmed')
                       AND starts_at >= ?2
                     ORDER BY starts_at ASC LIMIT 1"
                ),
                params![address, now],
                booking_from_row,
            );
            match result {
                Ok(booking) => Ok(Some(booking)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert reminder rows in a single transaction.
pub async fn insert_reminders(db: &Database, reminders: &[Reminder]) -> Result<(), CitabotError> {
    let reminders = reminders.to_vec();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            for reminder in &reminders {
                tx.execute(
                    "INSERT INTO reminders (id, booking_id, due_at, status)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        reminder.id,
                        reminder.booking_id,
                        reminder.due_at.to_rfc3339(),
                        reminder.status.to_string(),
                    ],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark all pending reminders for a booking as cancelled.
pub async fn cancel_reminders(db: &Database, booking_id: &str) -> Result<(), CitabotError> {
    let booking_id = booking_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE reminders SET status = 'cancelled'
                 WHERE booking_id = ?1 AND status = 'pending'",
                params![booking_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
