// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Citabot integration tests.
//!
//! Provides mock adapters for fast, deterministic, CI-runnable tests
//! without external services.
//!
//! # Components
//!
//! - [`MockChannel`] - messaging channel with injection, capture, and scriptable send failures
//! - [`MockProvider`] - language provider with scripted replies
//! - [`MockScheduler`] - scheduling vendor with controllable availability

pub mod mock_channel;
pub mod mock_provider;
pub mod mock_scheduler;

pub use mock_channel::MockChannel;
pub use mock_provider::MockProvider;
pub use mock_scheduler::MockScheduler;
