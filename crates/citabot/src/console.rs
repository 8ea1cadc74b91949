// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Console channel adapter: stdin in, stdout out.
//!
//! The production transport terminates at a messaging vendor webhook,
//! which lives outside this binary. The console adapter exercises the
//! full engine locally: each typed line arrives as an inbound message
//! from a fixed development identity.

use async_trait::async_trait;
use chrono::Utc;
use citabot_core::CitabotError;
use citabot_core::traits::ChannelAdapter;
use citabot_core::types::{DeliveryReceipt, InboundMessage, OutboundMessage, SendError};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

/// Identity attributed to everything typed on stdin.
const CONSOLE_IDENTITY: &str = "+34000000000";

pub struct ConsoleChannel {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl ConsoleChannel {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

#[async_trait]
impl ChannelAdapter for ConsoleChannel {
    fn name(&self) -> &str {
        "console"
    }

    async fn connect(&mut self) -> Result<(), CitabotError> {
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<DeliveryReceipt, SendError> {
        println!("citabot → {}: {}", msg.to, msg.body);
        Ok(DeliveryReceipt {
            delivery_id: format!("console-{}", uuid::Uuid::new_v4()),
            status: "delivered".to_string(),
        })
    }

    async fn receive(&self) -> Result<InboundMessage, CitabotError> {
        let mut lines = self.lines.lock().await;
        match lines.next_line().await {
            Ok(Some(line)) => Ok(InboundMessage {
                message_id: format!("console-{}", uuid::Uuid::new_v4()),
                sender: CONSOLE_IDENTITY.to_string(),
                body: line,
                received_at: Utc::now(),
            }),
            Ok(None) => Err(CitabotError::Channel {
                message: "stdin closed".into(),
                source: None,
            }),
            Err(e) => Err(CitabotError::Channel {
                message: "failed to read from stdin".into(),
                source: Some(Box::new(e)),
            }),
        }
    }
}
