// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for messaging transport integrations (WhatsApp, SMS, etc.).

use async_trait::async_trait;

use crate::error::CitabotError;
use crate::types::{DeliveryReceipt, InboundMessage, OutboundMessage, SendError};

/// Adapter for a bidirectional messaging transport.
///
/// Delivery is at-least-once: adapters make no deduplication guarantees,
/// and duplicate inbound messages are handled upstream by the engine.
/// Failed sends surface the vendor-specific error code via [`SendError`]
/// so the delivery interpreter can classify them.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Human-readable channel name (e.g. "whatsapp") used in consent records.
    fn name(&self) -> &str;

    /// Establishes a connection to the messaging platform.
    async fn connect(&mut self) -> Result<(), CitabotError>;

    /// Sends a message through the channel.
    async fn send(&self, msg: OutboundMessage) -> Result<DeliveryReceipt, SendError>;

    /// Receives the next inbound message from the channel.
    async fn receive(&self) -> Result<InboundMessage, CitabotError>;
}
