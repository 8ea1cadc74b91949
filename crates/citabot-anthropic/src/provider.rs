// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`LanguageProvider`] implementation backed by the Anthropic Messages API.
//!
//! Structured output is obtained through forced tool calling: the request
//! carries a single tool whose input schema is the analysis schema, and
//! `tool_choice` pins the model to it. A model that answers with plain
//! text anyway surfaces as [`AnalysisReply::Text`] for the caller to
//! handle.

use async_trait::async_trait;
use citabot_core::CitabotError;
use citabot_core::traits::{AnalysisReply, AnalysisRequest, LanguageProvider};
use tracing::debug;

use crate::client::AnthropicClient;
use crate::types::{
    ApiMessage, MessageRequest, ResponseContentBlock, ToolChoice, ToolDefinition,
};

/// Name of the tool the model is forced to call.
const ANALYSIS_TOOL: &str = "record_analysis";

pub struct AnthropicProvider {
    client: AnthropicClient,
    max_tokens: u32,
}

impl AnthropicProvider {
    pub fn new(client: AnthropicClient, max_tokens: u32) -> Self {
        Self { client, max_tokens }
    }
}

#[async_trait]
impl LanguageProvider for AnthropicProvider {
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisReply, CitabotError> {
        let messages = request
            .transcript
            .iter()
            .map(|m| ApiMessage {
                role: m.role.clone(),
                content: m.text.clone(),
            })
            .collect();

        let api_request = MessageRequest {
            model: self.client.default_model().to_string(),
            messages,
            system: Some(request.system_prompt),
            max_tokens: self.max_tokens,
            stream: false,
            tools: Some(vec![ToolDefinition {
                name: ANALYSIS_TOOL.to_string(),
                description: "Record the structured analysis of the client's message."
                    .to_string(),
                input_schema: request.schema,
            }]),
            tool_choice: Some(ToolChoice::Tool {
                name: ANALYSIS_TOOL.to_string(),
            }),
        };

        let response = self.client.complete_message(&api_request).await?;
        debug!(
            response_id = %response.id,
            stop_reason = ?response.stop_reason,
            "analysis response received"
        );

        let mut text_parts = Vec::new();
        for block in response.content {
            match block {
                ResponseContentBlock::ToolUse { name, input, .. } if name == ANALYSIS_TOOL => {
                    return Ok(AnalysisReply::Structured(input));
                }
                ResponseContentBlock::ToolUse { name, .. } => {
                    debug!(tool = %name, "ignoring unexpected tool invocation");
                }
                ResponseContentBlock::Text { text } => text_parts.push(text),
            }
        }

        Ok(AnalysisReply::Text(text_parts.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citabot_core::traits::TranscriptMessage;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base_url: &str) -> AnthropicProvider {
        let client = AnthropicClient::new(
            "test-api-key",
            "2023-06-01",
            "claude-sonnet-4-20250514",
            Duration::from_secs(10),
        )
        .unwrap()
        .with_base_url(base_url.to_string());
        AnthropicProvider::new(client, 1024)
    }

    fn analysis_request() -> AnalysisRequest {
        AnalysisRequest {
            system_prompt: "You analyze salon booking messages.".into(),
            transcript: vec![TranscriptMessage {
                role: "user".into(),
                text: "quiero un corte mañana a las 10".into(),
            }],
            schema: serde_json::json!({
                "type": "object",
                "properties": {"intent": {"type": "string"}},
                "required": ["intent"]
            }),
        }
    }

    #[tokio::test]
    async fn tool_use_response_becomes_structured_reply() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [{
                "type": "tool_use",
                "id": "toolu_1",
                "name": "record_analysis",
                "input": {"intent": "book_appointment", "confidence": 0.92}
            }],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 50, "output_tokens": 30}
        });

        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(serde_json::json!({
                "tool_choice": {"type": "tool", "name": "record_analysis"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let reply = provider(&server.uri())
            .analyze(analysis_request())
            .await
            .unwrap();
        match reply {
            AnalysisReply::Structured(value) => {
                assert_eq!(value["intent"], "book_appointment");
            }
            other => panic!("expected Structured, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn text_response_becomes_text_reply() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "id": "msg_2",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": "No estoy seguro."}],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 20, "output_tokens": 10}
        });

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let reply = provider(&server.uri())
            .analyze(analysis_request())
            .await
            .unwrap();
        match reply {
            AnalysisReply::Text(text) => assert_eq!(text, "No estoy seguro."),
            other => panic!("expected Text, got {other:?}"),
        }
    }
}
