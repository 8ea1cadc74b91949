// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only consent ledger operations.

use citabot_core::CitabotError;
use citabot_core::types::{ConsentRecord, ConsentType, Identity};
use rusqlite::params;

use crate::database::{Database, parse_enum, parse_ts};

/// Append a consent event. Existing rows are never touched; a withdrawal
/// supersedes prior grants purely by being newer.
pub async fn append(db: &Database, record: &ConsentRecord) -> Result<(), CitabotError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO consents (identity, consent_type, granted, recorded_at, purpose, channel)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.identity.as_str(),
                    record.consent_type.to_string(),
                    record.granted,
                    record.recorded_at.to_rfc3339(),
                    record.purpose,
                    record.channel,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Latest consent record for (identity, type), or None if never recorded.
pub async fn latest(
    db: &Database,
    identity: &Identity,
    consent_type: ConsentType,
) -> Result<Option<ConsentRecord>, CitabotError> {
    let address = identity.as_str().to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT identity, consent_type, granted, recorded_at, purpose, channel
                 FROM consents WHERE identity = ?1 AND consent_type = ?2
                 ORDER BY recorded_at DESC, id DESC LIMIT 1",
                params![address, consent_type.to_string()],
                |row| {
                    Ok(ConsentRecord {
                        identity: Identity(row.get(0)?),
                        consent_type: parse_enum(1, row.get(1)?)?,
                        granted: row.get(2)?,
                        recorded_at: parse_ts(3, row.get(3)?)?,
                        purpose: row.get(4)?,
                        channel: row.get(5)?,
                    })
                },
            );
            match result {
                Ok(record) => Ok(Some(record)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
