// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The dialogue engine: one task per inbound message.
//!
//! Each turn runs under the sender's identity lock so concurrent messages
//! from the same person cannot interleave their load-merge-save cycles.
//! The whole turn runs under a deadline; on expiry the user gets a fixed
//! technical-issue reply instead of silence.
//!
//! Consent is checked before anything else touches the message. Bare
//! STOP/SI-style keywords are honored without a language-understanding
//! call, so a withdrawal works even when the provider is down.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use citabot_booking::{BookingOrchestrator, BookingOutcome};
use citabot_config::CitabotConfig;
use citabot_consent::{ConsentGate, ConsentKeyword};
use citabot_core::CitabotError;
use citabot_core::traits::{
    BookingStore, ChannelAdapter, ClientDirectory, ConsentStore, LanguageProvider,
    SchedulingAdapter, SuppressionList,
};
use citabot_core::types::{
    ConsentType, ConversationContext, Identity, InboundMessage, IntentAnalysis, IntentLabel,
    OutboundMessage, SendError, Turn,
};
use citabot_delivery::RecommendedAction;
use citabot_intent::{Analyzer, MergeOutcome, Prefilter, ServiceCatalog, merge};
use citabot_session::{IdentityLocks, InMemorySessionStore, SessionStore};
use tracing::{debug, error, info, warn};

use crate::responses;

/// Durable-store handles the engine needs, grouped so [`Engine::new`]
/// stays readable when all four come from one backend.
pub struct StoreHandles {
    pub consents: Arc<dyn ConsentStore>,
    pub bookings: Arc<dyn BookingStore>,
    pub clients: Arc<dyn ClientDirectory>,
    pub suppressions: Arc<dyn SuppressionList>,
}

pub struct Engine {
    channel: Arc<dyn ChannelAdapter>,
    gate: ConsentGate,
    sessions: InMemorySessionStore,
    locks: IdentityLocks,
    analyzer: Analyzer,
    orchestrator: BookingOrchestrator,
    bookings: Arc<dyn BookingStore>,
    suppressions: Arc<dyn SuppressionList>,
    channel_name: String,
    session_ttl: Duration,
    turn_deadline: StdDuration,
    send_timeout: StdDuration,
    min_confidence: f32,
}

impl Engine {
    pub fn new(
        config: &CitabotConfig,
        channel: Arc<dyn ChannelAdapter>,
        provider: Arc<dyn LanguageProvider>,
        scheduler: Arc<dyn SchedulingAdapter>,
        stores: StoreHandles,
    ) -> Self {
        let catalog = ServiceCatalog::new(&config.booking.services);
        let analyzer = Analyzer::new(
            provider,
            Prefilter::new(catalog),
            StdDuration::from_secs(config.anthropic.request_timeout_secs),
        );
        let orchestrator = BookingOrchestrator::new(
            scheduler,
            Arc::clone(&stores.bookings),
            Arc::clone(&stores.clients),
            config.booking.services.clone(),
            Duration::hours(config.booking.lookback_hours),
            Duration::days(config.scheduling.alternatives_window_days),
            config.booking.reminder_offsets_minutes.clone(),
            StdDuration::from_secs(config.scheduling.request_timeout_secs),
            config.channel.name.clone(),
        );

        Self {
            channel,
            gate: ConsentGate::new(stores.consents),
            sessions: InMemorySessionStore::new(Duration::minutes(config.session.ttl_minutes)),
            locks: IdentityLocks::new(StdDuration::from_secs(config.session.lock_idle_secs)),
            analyzer,
            orchestrator,
            bookings: stores.bookings,
            suppressions: stores.suppressions,
            channel_name: config.channel.name.clone(),
            session_ttl: Duration::minutes(config.session.ttl_minutes),
            turn_deadline: StdDuration::from_secs(config.agent.turn_deadline_secs),
            send_timeout: StdDuration::from_secs(config.channel.send_timeout_secs),
            min_confidence: config.booking.min_confidence,
        }
    }

    /// Receive loop: spawns one task per inbound message so a slow turn
    /// never blocks the next sender.
    pub async fn run(self: Arc<Self>) -> Result<(), CitabotError> {
        info!(channel = self.channel.name(), "engine started");
        loop {
            let msg = self.channel.receive().await?;
            let engine = Arc::clone(&self);
            tokio::spawn(async move {
                engine.handle_message(msg).await;
            });
        }
    }

    /// Handles one inbound message end to end: turn processing under the
    /// deadline, then outbound delivery.
    pub async fn handle_message(&self, msg: InboundMessage) {
        let identity = Identity::normalize(&msg.sender);
        if identity.as_str().is_empty() {
            warn!(message_id = %msg.message_id, "inbound message has no usable sender address, dropping");
            return;
        }
        debug!(identity = %identity, message_id = %msg.message_id, "inbound message");

        let reply = match tokio::time::timeout(
            self.turn_deadline,
            self.process_turn(&identity, &msg.body),
        )
        .await
        {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                error!(identity = %identity, error = %e, "turn processing failed");
                Some(responses::TECHNICAL_ISSUE.to_string())
            }
            Err(_) => {
                error!(
                    identity = %identity,
                    deadline = ?self.turn_deadline,
                    "turn deadline expired, sending fallback reply"
                );
                Some(responses::TECHNICAL_ISSUE.to_string())
            }
        };

        if let Some(body) = reply {
            self.deliver(&identity, body).await;
        }
    }

    /// Live conversation contexts, for health reporting.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Drops expired contexts and idle identity locks. Returns how many
    /// of each were removed.
    pub fn maintenance_sweep(&self) -> (usize, usize) {
        (self.sessions.sweep(), self.locks.sweep())
    }

    async fn process_turn(
        &self,
        identity: &Identity,
        body: &str,
    ) -> Result<Option<String>, CitabotError> {
        let _guard = self.locks.acquire(identity).await;

        if body.trim().is_empty() {
            debug!(identity = %identity, "empty message body, ignoring");
            return Ok(None);
        }

        // Keyword pass first: STOP must work even if everything else is down.
        if let Some(keyword) = citabot_consent::classify(body) {
            let reply = self.handle_consent_keyword(identity, keyword).await?;
            return Ok(Some(reply));
        }

        if !self
            .gate
            .check(identity, ConsentType::ChannelCommunication)
            .await
        {
            debug!(identity = %identity, "no consent grant on file, prompting");
            return Ok(Some(responses::CONSENT_PROMPT.to_string()));
        }

        let mut context = match self.sessions.load(identity).await? {
            Some(ctx) => ctx,
            None => ConversationContext::new(identity.clone(), self.session_ttl),
        };

        let analysis = self.analyzer.analyze(body, Some(&context)).await;
        let outcome = merge(
            self.analyzer.prefilter().catalog(),
            &mut context,
            &analysis,
            Utc::now().date_naive(),
        );

        let (reply, booking_settled) = self.route(identity, &context, &analysis, &outcome).await?;

        if booking_settled {
            // The conversation reached its goal; the next message starts fresh.
            self.sessions.clear(identity).await?;
        } else {
            context.push_turn(Turn {
                inbound: body.to_string(),
                response: reply.clone(),
                analysis: Some(analysis),
            });
            self.sessions.save(context).await?;
        }
        Ok(Some(reply))
    }

    async fn handle_consent_keyword(
        &self,
        identity: &Identity,
        keyword: ConsentKeyword,
    ) -> Result<String, CitabotError> {
        match keyword {
            ConsentKeyword::Grant => {
                self.gate
                    .record(
                        identity,
                        ConsentType::ChannelCommunication,
                        true,
                        Some("booking communications"),
                        &self.channel_name,
                    )
                    .await?;
                Ok(responses::CONSENT_GRANTED.to_string())
            }
            ConsentKeyword::Withdraw => {
                self.gate
                    .record(
                        identity,
                        ConsentType::ChannelCommunication,
                        false,
                        Some("booking communications"),
                        &self.channel_name,
                    )
                    .await?;
                // Slot-filling progress is personal data we no longer have
                // a basis to hold.
                self.sessions.clear(identity).await?;
                Ok(responses::CONSENT_WITHDRAWN.to_string())
            }
        }
    }

    /// Decides the turn's reply. The second element is true when the
    /// conversation goal was settled and the context should be dropped.
    async fn route(
        &self,
        identity: &Identity,
        context: &ConversationContext,
        analysis: &IntentAnalysis,
        outcome: &MergeOutcome,
    ) -> Result<(String, bool), CitabotError> {
        if analysis.intent == IntentLabel::CancelBooking
            && analysis.confidence >= self.min_confidence
        {
            return self.handle_cancellation(identity).await;
        }

        if analysis.confidence < self.min_confidence {
            let reply = analysis
                .suggested_response
                .clone()
                .unwrap_or_else(|| responses::CLARIFY.to_string());
            return Ok((reply, false));
        }

        if outcome.ready {
            return match self.orchestrator.attempt(context).await? {
                BookingOutcome::Confirmed { booking } => {
                    Ok((responses::booking_confirmed(&booking), true))
                }
                BookingOutcome::NoAvailability { alternatives } => {
                    Ok((responses::no_availability(&alternatives), false))
                }
                BookingOutcome::Failed { reason } => {
                    error!(
                        identity = %identity,
                        reason,
                        "booking attempt failed, operator attention needed"
                    );
                    Ok((responses::BOOKING_FAILED.to_string(), false))
                }
            };
        }

        let reply = analysis
            .suggested_response
            .clone()
            .unwrap_or_else(|| responses::ask_missing(&outcome.missing));
        Ok((reply, false))
    }

    async fn handle_cancellation(
        &self,
        identity: &Identity,
    ) -> Result<(String, bool), CitabotError> {
        match self.bookings.find_active_for_identity(identity).await? {
            Some(booking) => match self.orchestrator.cancel(&booking).await {
                Ok(()) => Ok((responses::booking_cancelled(&booking), true)),
                Err(e) => {
                    error!(
                        identity = %identity,
                        booking_id = %booking.id,
                        error = %e,
                        "cancellation failed"
                    );
                    Ok((responses::BOOKING_FAILED.to_string(), false))
                }
            },
            None => Ok((responses::NO_ACTIVE_BOOKING.to_string(), false)),
        }
    }

    /// Sends one outbound message, honoring the suppression list and
    /// applying the recommended action when delivery fails.
    async fn deliver(&self, identity: &Identity, body: String) {
        match self.suppressions.is_suppressed(identity).await {
            Ok(true) => {
                debug!(identity = %identity, "recipient suppressed, dropping outbound message");
                return;
            }
            Ok(false) => {}
            Err(e) => {
                // A suppression-list outage should not silence everyone.
                warn!(identity = %identity, error = %e, "suppression lookup failed, sending anyway");
            }
        }

        let msg = OutboundMessage {
            to: identity.clone(),
            body,
        };
        match tokio::time::timeout(self.send_timeout, self.channel.send(msg.clone())).await {
            Ok(Ok(receipt)) => {
                debug!(identity = %identity, delivery_id = %receipt.delivery_id, "message sent");
            }
            Ok(Err(e)) => self.handle_send_failure(identity, msg, e).await,
            Err(_) => {
                warn!(identity = %identity, timeout = ?self.send_timeout, "outbound send timed out");
            }
        }
    }

    async fn handle_send_failure(&self, identity: &Identity, msg: OutboundMessage, error: SendError) {
        let interpretation = citabot_delivery::interpret(&error);
        warn!(
            identity = %identity,
            code = ?interpretation.code,
            class = %interpretation.class,
            detail = %interpretation.message,
            "outbound delivery failed"
        );

        match interpretation.action {
            RecommendedAction::AlertOperator => {
                error!(
                    class = %interpretation.class,
                    detail = %interpretation.message,
                    "channel sender misconfigured, operator attention required"
                );
            }
            RecommendedAction::SuppressRecipient => {
                if let Err(e) = self
                    .suppressions
                    .suppress(identity, &interpretation.message)
                    .await
                {
                    error!(identity = %identity, error = %e, "failed to record suppression");
                }
            }
            RecommendedAction::CorrectAndRetry => {
                match citabot_delivery::correct_address(identity.as_str()) {
                    Some(corrected) => {
                        let retry = OutboundMessage {
                            to: Identity(corrected.clone()),
                            body: msg.body,
                        };
                        match tokio::time::timeout(self.send_timeout, self.channel.send(retry))
                            .await
                        {
                            Ok(Ok(_)) => {
                                info!(identity = %corrected, "send succeeded after address correction");
                            }
                            _ => {
                                error!(
                                    identity = %corrected,
                                    "send retry after address correction failed, escalating"
                                );
                            }
                        }
                    }
                    None => {
                        error!(identity = %identity, "address not correctable, escalating");
                    }
                }
            }
            RecommendedAction::Escalate => {
                // Metadata only: the body may contain personal data.
                error!(
                    identity = %identity,
                    code = ?interpretation.code,
                    body_len = msg.body.len(),
                    "delivery failure escalated to operator"
                );
            }
            RecommendedAction::RetryAfterBackoff { backoff } => {
                warn!(identity = %identity, ?backoff, "rate limited, deferring retry");
            }
            RecommendedAction::None => {}
        }
    }
}
