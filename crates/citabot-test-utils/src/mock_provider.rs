// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock language provider with scripted replies.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use citabot_core::CitabotError;
use citabot_core::traits::{AnalysisReply, AnalysisRequest, LanguageProvider};

enum ScriptedReply {
    Reply(AnalysisReply),
    Error(String),
}

/// Scripted [`LanguageProvider`].
///
/// Replies queued via `push_structured` / `push_text` / `push_error` are
/// consumed in order; when the queue runs dry, every call returns a
/// neutral general-inquiry analysis. Received requests are recorded for
/// assertions.
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<ScriptedReply>>>,
    requests: Arc<Mutex<Vec<AnalysisRequest>>>,
    delay: Arc<Mutex<Option<Duration>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            delay: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn push_structured(&self, value: serde_json::Value) {
        self.replies
            .lock()
            .await
            .push_back(ScriptedReply::Reply(AnalysisReply::Structured(value)));
    }

    pub async fn push_text(&self, text: &str) {
        self.replies
            .lock()
            .await
            .push_back(ScriptedReply::Reply(AnalysisReply::Text(text.to_string())));
    }

    pub async fn push_error(&self, message: &str) {
        self.replies
            .lock()
            .await
            .push_back(ScriptedReply::Error(message.to_string()));
    }

    /// Delays every subsequent call, for exercising timeout paths.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.lock().await = Some(delay);
    }

    /// Requests received so far, in order.
    pub async fn requests(&self) -> Vec<AnalysisRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    fn default_reply() -> AnalysisReply {
        AnalysisReply::Structured(serde_json::json!({
            "intent": "general_inquiry",
            "confidence": 0.5,
            "ready": false
        }))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LanguageProvider for MockProvider {
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisReply, CitabotError> {
        self.requests.lock().await.push(request);

        let delay = *self.delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.replies.lock().await.pop_front() {
            Some(ScriptedReply::Reply(reply)) => Ok(reply),
            Some(ScriptedReply::Error(message)) => Err(CitabotError::Provider {
                message,
                source: None,
            }),
            None => Ok(Self::default_reply()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citabot_core::traits::TranscriptMessage;

    fn request(text: &str) -> AnalysisRequest {
        AnalysisRequest {
            system_prompt: "test".into(),
            transcript: vec![TranscriptMessage {
                role: "user".into(),
                text: text.into(),
            }],
            schema: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn scripted_replies_come_back_in_order() {
        let provider = MockProvider::new();
        provider
            .push_structured(serde_json::json!({"intent": "book_appointment"}))
            .await;
        provider.push_error("rate limited").await;

        match provider.analyze(request("uno")).await.unwrap() {
            AnalysisReply::Structured(v) => assert_eq!(v["intent"], "book_appointment"),
            other => panic!("expected Structured, got {other:?}"),
        }
        assert!(provider.analyze(request("dos")).await.is_err());

        // Queue exhausted: neutral default.
        match provider.analyze(request("tres")).await.unwrap() {
            AnalysisReply::Structured(v) => assert_eq!(v["intent"], "general_inquiry"),
            other => panic!("expected Structured, got {other:?}"),
        }

        assert_eq!(provider.request_count().await, 3);
        assert_eq!(provider.requests().await[0].transcript[0].text, "uno");
    }
}
