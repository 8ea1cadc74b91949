// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQL query modules, one per table family.

pub mod bookings;
pub mod clients;
pub mod consents;
pub mod suppressions;
