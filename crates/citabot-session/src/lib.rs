// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation session state: the in-memory context store with sliding
//! TTL and the per-identity lock registry that serializes concurrent
//! turns for the same identity.

pub mod locks;
pub mod store;

pub use locks::IdentityLocks;
pub use store::{InMemorySessionStore, SessionStore};
