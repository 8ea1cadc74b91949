// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Citabot dialogue engine.
//!
//! Ties the adapter seams together: messages come in from the channel,
//! pass the consent gate, get analyzed and merged into the conversation
//! context, and, once the slot map is complete, become bookings. Replies
//! go back out through the same channel with delivery-failure handling.

pub mod engine;
pub mod responses;

pub use engine::{Engine, StoreHandles};
