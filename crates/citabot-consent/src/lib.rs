// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Consent gate for the booking assistant.
//!
//! Blocks all downstream processing for an identity until a valid consent
//! grant exists, and honors bare STOP/START-style keywords before any
//! language-understanding call.

pub mod gate;
pub mod keywords;

pub use gate::ConsentGate;
pub use keywords::{ConsentKeyword, classify};
