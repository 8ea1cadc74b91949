// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The two-stage extraction pipeline: deterministic pre-filter, then the
//! language-understanding call with post-hoc confidence adjustment.
//!
//! This module never returns an error to the caller. Provider failure,
//! timeout, and malformed output all degrade to the conservative fallback
//! analysis, because a turn must always get an answer.

use std::sync::Arc;
use std::time::Duration;

use citabot_core::traits::{AnalysisReply, AnalysisRequest, LanguageProvider, TranscriptMessage};
use citabot_core::types::{ConversationContext, IntentAnalysis};
use tracing::{debug, warn};

use crate::prefilter::{Prefilter, PrefilterHits};
use crate::schema;

/// Factor applied to confidence when the model claims a service the
/// pre-filter did not see in the text. Penalizes plausible-but-unsupported
/// hallucination without zeroing a possibly-legitimate extraction.
const UNSUPPORTED_SERVICE_PENALTY: f32 = 0.5;

/// Longest free-text provider reply we will pass through as a suggested
/// response instead of discarding.
const MAX_FALLBACK_TEXT_LEN: usize = 300;

pub struct Analyzer {
    provider: Arc<dyn LanguageProvider>,
    prefilter: Prefilter,
    timeout: Duration,
}

impl Analyzer {
    pub fn new(provider: Arc<dyn LanguageProvider>, prefilter: Prefilter, timeout: Duration) -> Self {
        Self {
            provider,
            prefilter,
            timeout,
        }
    }

    pub fn prefilter(&self) -> &Prefilter {
        &self.prefilter
    }

    /// Analyzes one inbound message in the context of the conversation.
    pub async fn analyze(
        &self,
        text: &str,
        context: Option<&ConversationContext>,
    ) -> IntentAnalysis {
        let hits = self.prefilter.scan(text);
        let request = self.build_request(text, context, &hits);

        let reply = match tokio::time::timeout(self.timeout, self.provider.analyze(request)).await
        {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                warn!(error = %e, "language provider failed, using fallback analysis");
                return IntentAnalysis::fallback();
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "language provider timed out, using fallback analysis");
                return IntentAnalysis::fallback();
            }
        };

        match reply {
            AnalysisReply::Structured(value) => match schema::validate_analysis(&value) {
                Some(analysis) => self.adjust_confidence(analysis, &hits),
                None => {
                    warn!("provider returned structured output that failed validation");
                    IntentAnalysis::fallback()
                }
            },
            AnalysisReply::Text(text) => {
                debug!("provider answered with free text instead of the analysis tool");
                let mut fallback = IntentAnalysis::fallback();
                let trimmed = text.trim();
                if !trimmed.is_empty() && trimmed.len() <= MAX_FALLBACK_TEXT_LEN {
                    fallback.suggested_response = Some(trimmed.to_string());
                }
                fallback
            }
        }
    }

    fn build_request(
        &self,
        text: &str,
        context: Option<&ConversationContext>,
        hits: &PrefilterHits,
    ) -> AnalysisRequest {
        let service_names = self.prefilter.catalog().names();

        let prefilter_note = if hits.services.is_empty() {
            "A deterministic pre-scan found no catalog service mentioned in the \
             latest message. "
                .to_string()
        } else {
            format!(
                "A deterministic pre-scan found these services mentioned: {}. ",
                hits.services.join(", ")
            )
        };

        let mut transcript = Vec::new();
        if let Some(ctx) = context {
            for turn in &ctx.turns {
                transcript.push(TranscriptMessage {
                    role: "user".to_string(),
                    text: turn.inbound.clone(),
                });
                transcript.push(TranscriptMessage {
                    role: "assistant".to_string(),
                    text: turn.response.clone(),
                });
            }
        }
        transcript.push(TranscriptMessage {
            role: "user".to_string(),
            text: text.to_string(),
        });

        AnalysisRequest {
            system_prompt: schema::system_prompt(&service_names, &prefilter_note),
            transcript,
            schema: schema::analysis_schema(&service_names),
        }
    }

    /// Down-adjusts confidence when the model names a service the
    /// pre-filter did not find in the text.
    fn adjust_confidence(&self, mut analysis: IntentAnalysis, hits: &PrefilterHits) -> IntentAnalysis {
        if let Some(ref claimed) = analysis.entities.service {
            let supported = self
                .prefilter
                .catalog()
                .resolve(claimed)
                .is_some_and(|canonical| hits.services.iter().any(|s| s == canonical));
            if !supported {
                let original = analysis.confidence;
                analysis.confidence *= UNSUPPORTED_SERVICE_PENALTY;
                debug!(
                    claimed = %claimed,
                    original,
                    adjusted = analysis.confidence,
                    "service claim unsupported by pre-filter, confidence reduced"
                );
            }
        }
        analysis
    }
}
