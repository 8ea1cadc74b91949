// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! Implements `ChannelAdapter` with injectable inbound messages, captured
//! outbound messages, and scriptable send failures for exercising the
//! delivery-error path.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use citabot_core::CitabotError;
use citabot_core::traits::ChannelAdapter;
use citabot_core::types::{DeliveryReceipt, InboundMessage, OutboundMessage, SendError};

/// A mock messaging channel for testing.
///
/// Three queues:
/// - **inbound**: messages injected via `inject_message()` come back from `receive()`
/// - **sent**: successful `send()` calls are captured for assertions
/// - **failures**: errors queued via `fail_next_send()` are returned by the
///   next `send()` calls, in order
pub struct MockChannel {
    inbound: Arc<Mutex<VecDeque<InboundMessage>>>,
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    failures: Arc<Mutex<VecDeque<SendError>>>,
    notify: Arc<Notify>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(VecDeque::new())),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Injects an inbound message; the next `receive()` returns it.
    pub async fn inject_message(&self, msg: InboundMessage) {
        self.inbound.lock().await.push_back(msg);
        self.notify.notify_one();
    }

    /// Queues an error for the next `send()` call.
    pub async fn fail_next_send(&self, error: SendError) {
        self.failures.lock().await.push_back(error);
    }

    /// All messages successfully sent so far.
    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    async fn connect(&mut self) -> Result<(), CitabotError> {
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<DeliveryReceipt, SendError> {
        if let Some(error) = self.failures.lock().await.pop_front() {
            return Err(error);
        }
        self.sent.lock().await.push(msg);
        Ok(DeliveryReceipt {
            delivery_id: format!("mock-msg-{}", uuid::Uuid::new_v4()),
            status: "queued".to_string(),
        })
    }

    async fn receive(&self) -> Result<InboundMessage, CitabotError> {
        loop {
            {
                let mut queue = self.inbound.lock().await;
                if let Some(msg) = queue.pop_front() {
                    return Ok(msg);
                }
            }
            // Wait until a new message is injected.
            self.notify.notified().await;
        }
    }
}
