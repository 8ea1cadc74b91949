// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client directory operations (find-or-create by normalized address).

use citabot_core::CitabotError;
use citabot_core::types::{ClientRef, Identity};
use rusqlite::params;

use crate::database::Database;

/// Find a client by normalized address, creating the row if absent.
///
/// A display name supplied on a later turn fills in a previously unknown
/// name but never overwrites an existing one.
pub async fn find_or_create(
    db: &Database,
    identity: &Identity,
    display_name: Option<&str>,
) -> Result<ClientRef, CitabotError> {
    let address = identity.as_str().to_string();
    let display_name = display_name.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            let existing = conn
                .query_row(
                    "SELECT id, display_name FROM clients WHERE address = ?1",
                    params![address],
                    |row| {
                        Ok(ClientRef {
                            id: row.get(0)?,
                            display_name: row.get(1)?,
                        })
                    },
                )
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(other),
                })?;

            let now = chrono::Utc::now().to_rfc3339();
            match existing {
                Some(mut client) => {
                    if client.display_name.is_none()
                        && let Some(ref name) = display_name
                    {
                        conn.execute(
                            "UPDATE clients SET display_name = ?1, updated_at = ?2 WHERE id = ?3",
                            params![name, now, client.id],
                        )?;
                        client.display_name = Some(name.clone());
                    }
                    Ok(client)
                }
                None => {
                    let id = uuid::Uuid::new_v4().to_string();
                    conn.execute(
                        "INSERT INTO clients (id, address, display_name, created_at, updated_at)
                         VALUES (?1, ?2, ?3, ?4, ?4)",
                        params![id, address, display_name, now],
                    )?;
                    Ok(ClientRef {
                        id,
                        display_name,
                    })
                }
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
