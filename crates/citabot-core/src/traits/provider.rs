// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Language-understanding provider trait.
//!
//! The provider is an untrusted collaborator: it may return a
//! schema-conformant structured result, free text, or garbage. Callers
//! validate everything before use and always keep a deterministic fallback.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CitabotError;

/// One message of trimmed conversation history passed to the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMessage {
    /// "user" or "assistant".
    pub role: String,
    pub text: String,
}

/// A structured-analysis request for the language-understanding service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub system_prompt: String,
    /// Trimmed turn history, oldest first, ending with the current message.
    pub transcript: Vec<TranscriptMessage>,
    /// JSON Schema the provider is asked to conform to via its
    /// function/tool-calling contract.
    pub schema: serde_json::Value,
}

/// What the provider actually returned: a structured value matching (or
/// claiming to match) the requested schema, or free text needing a
/// fallback parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AnalysisReply {
    Structured(serde_json::Value),
    Text(String),
}

/// Adapter for the external language-understanding service.
#[async_trait]
pub trait LanguageProvider: Send + Sync {
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisReply, CitabotError>;
}
