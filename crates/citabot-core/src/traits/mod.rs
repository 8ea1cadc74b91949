// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for all Citabot collaborator seams.

pub mod channel;
pub mod provider;
pub mod scheduling;
pub mod store;

pub use channel::ChannelAdapter;
pub use provider::{AnalysisReply, AnalysisRequest, LanguageProvider, TranscriptMessage};
pub use scheduling::{EventAttendee, SchedulingAdapter};
pub use store::{BookingStore, ClientDirectory, ConsentStore, SuppressionList};
