// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound suppression list.

use citabot_core::CitabotError;
use citabot_core::types::Identity;
use rusqlite::params;

use crate::database::Database;

pub async fn is_suppressed(db: &Database, identity: &Identity) -> Result<bool, CitabotError> {
    let address = identity.as_str().to_string();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM suppressions WHERE identity = ?1",
                params![address],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Add an identity to the suppression list. Re-suppressing keeps the
/// original reason and timestamp.
pub async fn suppress(db: &Database, identity: &Identity, reason: &str) -> Result<(), CitabotError> {
    let address = identity.as_str().to_string();
    let reason = reason.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO suppressions (identity, reason, created_at)
                 VALUES (?1, ?2, ?3)",
                params![address, reason, chrono::Utc::now().to_rfc3339()],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
