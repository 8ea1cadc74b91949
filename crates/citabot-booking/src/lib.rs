// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Booking orchestration: idempotency-key derivation and the
//! external-first booking transaction with reminder scheduling.

pub mod key;
pub mod orchestrator;

pub use key::BookingIntentKey;
pub use orchestrator::{BookingOrchestrator, BookingOutcome};
