// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Messages API integration.
//!
//! [`AnthropicClient`] is the raw HTTP client; [`AnthropicProvider`]
//! adapts it to the `LanguageProvider` trait with forced tool calling
//! for structured message analysis.

pub mod client;
pub mod provider;
pub mod types;

pub use client::AnthropicClient;
pub use provider::AnthropicProvider;
