// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL migration files are compiled into the binary at build time via
//! `embed_migrations!`. Migrations run automatically on database open.

use citabot_core::CitabotError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending migrations against the given connection.
///
/// Refinery tracks applied migrations in its own `refinery_schema_history` table.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), CitabotError> {
    embedded::migrations::runner()
        .run(conn)
        .map_err(|e| CitabotError::Storage {
            source: Box::new(e),
        })?;
    Ok(())
}

/// Variant used inside `tokio_rusqlite::Connection::call` closures, where
/// the error type must be boxable into `tokio_rusqlite::Error::Other`.
pub(crate) fn run_migrations_boxed(
    conn: &mut rusqlite::Connection,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    embedded::migrations::runner().run(conn)?;
    Ok(())
}
