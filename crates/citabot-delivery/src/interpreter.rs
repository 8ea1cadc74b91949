// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classification of outbound delivery failures.
//!
//! [`interpret`] is pure: it maps a vendor error code to a class, a
//! human-facing message, and a recommended action. Actually applying the
//! action (suppression, alerting, backoff) is the engine's job, which
//! keeps this table independently testable.

use std::time::Duration;

use citabot_core::types::{Identity, SendError};
use strum::Display;

/// Broad class of a delivery failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorClass {
    /// The sending identity itself is misconfigured; the whole channel is
    /// broken, not one message.
    Sender,
    /// The recipient address is invalid, blocked, or opted out.
    Recipient,
    /// The recipient address is malformed and may be correctable.
    Format,
    /// The message body was rejected by channel policy.
    Content,
    /// Throughput or rate window exceeded.
    Limits,
    Unknown,
}

/// What the engine should do about a failed send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendedAction {
    /// Page an operator: the channel configuration is broken.
    AlertOperator,
    /// Add the recipient to the suppression list.
    SuppressRecipient,
    /// Apply one deterministic address correction and retry once.
    CorrectAndRetry,
    /// Surface to an operator with metadata only.
    Escalate,
    /// Retry after the backoff window, with reduced rate for the identity.
    RetryAfterBackoff { backoff: Duration },
    /// Log and move on.
    None,
}

/// The interpreted failure, produced per failed send. Ephemeral.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryInterpretation {
    pub code: Option<u32>,
    pub class: ErrorClass,
    /// Operator-facing description. Never contains the message body.
    pub message: String,
    pub retryable: bool,
    pub action: RecommendedAction,
}

/// Default backoff for LIMITS-class failures.
const LIMITS_BACKOFF: Duration = Duration::from_secs(60);

/// Maps a vendor (Twilio-style) error code to its interpretation.
pub fn interpret(error: &SendError) -> DeliveryInterpretation {
    let (class, message, retryable, action): (ErrorClass, &str, bool, RecommendedAction) =
        match error.code {
            // Sending identity misconfigured.
            Some(21606) => (
                ErrorClass::Sender,
                "sending number is not enabled for this channel",
                false,
                RecommendedAction::AlertOperator,
            ),
            Some(21660) => (
                ErrorClass::Sender,
                "sending number is not owned by this account",
                false,
                RecommendedAction::AlertOperator,
            ),
            Some(63007) => (
                ErrorClass::Sender,
                "channel sender configuration not found",
                false,
                RecommendedAction::AlertOperator,
            ),
            // Recipient invalid, blocked, or absent from the channel.
            Some(21610) => (
                ErrorClass::Recipient,
                "recipient has opted out of messages from this sender",
                false,
                RecommendedAction::SuppressRecipient,
            ),
            Some(63003) => (
                ErrorClass::Recipient,
                "recipient has no presence on this channel",
                false,
                RecommendedAction::SuppressRecipient,
            ),
            Some(21612) => (
                ErrorClass::Recipient,
                "recipient is not reachable via this channel",
                false,
                RecommendedAction::SuppressRecipient,
            ),
            // Malformed address, possibly correctable.
            Some(21211) => (
                ErrorClass::Format,
                "recipient address is malformed",
                true,
                RecommendedAction::CorrectAndRetry,
            ),
            // Body rejected by channel policy.
            Some(63013) => (
                ErrorClass::Content,
                "message body violates channel policy",
                false,
                RecommendedAction::Escalate,
            ),
            Some(30007) => (
                ErrorClass::Content,
                "message was filtered by the carrier",
                false,
                RecommendedAction::Escalate,
            ),
            // Throughput limits.
            Some(20429) => (
                ErrorClass::Limits,
                "too many requests to the messaging API",
                true,
                RecommendedAction::RetryAfterBackoff {
                    backoff: LIMITS_BACKOFF,
                },
            ),
            Some(63018) => (
                ErrorClass::Limits,
                "channel rate limit exceeded for this recipient",
                true,
                RecommendedAction::RetryAfterBackoff {
                    backoff: LIMITS_BACKOFF,
                },
            ),
            _ => (
                ErrorClass::Unknown,
                "unrecognized delivery error",
                false,
                RecommendedAction::None,
            ),
        };

    DeliveryInterpretation {
        code: error.code,
        class,
        message: message.to_string(),
        retryable,
        action,
    }
}

/// One deterministic address-correction pass: strip separators, rewrite
/// an international `00` prefix, and restore a missing `+` on a bare
/// digit string of international length. A national-length number stays
/// untouched, since the country code cannot be guessed.
///
/// Returns None when correction would not change the address, which the
/// caller must treat as terminal.
pub fn correct_address(address: &str) -> Option<String> {
    let mut corrected = Identity::normalize(address).as_str().to_string();
    if !corrected.starts_with('+') && (10..=15).contains(&corrected.len()) {
        corrected.insert(0, '+');
    }
    if corrected == address || corrected.is_empty() {
        None
    } else {
        Some(corrected)
    }
}
