// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the booking assistant.
//!
//! A single [`Database`] wraps one tokio-rusqlite connection in WAL mode;
//! [`SqliteStore`] implements the storage traits from `citabot-core` on
//! top of it. Schema changes live as embedded refinery migrations under
//! `migrations/`.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStore;
pub use database::Database;
pub use migrations::run_migrations;
