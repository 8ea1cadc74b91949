// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Citabot engine.

use std::collections::VecDeque;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Maximum number of turns retained in a conversation context.
///
/// Older turns are dropped FIFO; the slot map is unaffected by eviction.
pub const MAX_TURNS: usize = 10;

/// A normalized channel address uniquely identifying a conversation participant.
///
/// All per-identity state (context, consent, locks) is keyed by this value,
/// so two spellings of the same phone number must normalize identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity(pub String);

impl Identity {
    /// Normalizes a raw channel address: strips separators, keeps a single
    /// leading `+`, and rewrites an international `00` prefix to `+`.
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        let mut out = String::with_capacity(trimmed.len());
        for c in trimmed.chars() {
            match c {
                '+' if out.is_empty() => out.push('+'),
                '0'..='9' => out.push(c),
                _ => {}
            }
        }
        if let Some(rest) = out.strip_prefix("00") {
            Self(format!("+{rest}"))
        } else {
            Self(out)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// --- Transport types ---

/// An inbound message received from the messaging transport.
///
/// Delivery is at-least-once: the same `message_id` may arrive more than
/// once, and distinct ids may carry identical bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Transport-assigned message identifier. Not stable across resends.
    pub message_id: String,
    /// Raw (unnormalized) sender address.
    pub sender: String,
    /// Free-text message body.
    pub body: String,
    pub received_at: DateTime<Utc>,
}

/// An outbound message to be sent via the messaging transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub to: Identity,
    pub body: String,
}

/// Delivery confirmation returned by a successful send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub delivery_id: String,
    pub status: String,
}

/// A failed outbound send, carrying the vendor-specific error code
/// consumed by the delivery error interpreter.
#[derive(Debug, Clone, thiserror::Error)]
#[error("send failed (code {code:?}): {message}")]
pub struct SendError {
    pub code: Option<u32>,
    pub message: String,
}

impl From<SendError> for crate::error::CitabotError {
    fn from(e: SendError) -> Self {
        crate::error::CitabotError::Channel {
            message: e.message.clone(),
            source: Some(Box::new(e)),
        }
    }
}

// --- Slot types ---

/// A named field the dialogue must collect before a booking can be attempted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SlotName {
    Service,
    Date,
    Time,
    ClientName,
    ContactEmail,
}

/// Accumulated slot values for one conversation.
///
/// Values are merged last-write-wins per field, never per turn; a field is
/// only overwritten by a new non-empty value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotMap {
    pub service: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub client_name: Option<String>,
    pub contact_email: Option<String>,
}

impl SlotMap {
    /// Required fields still missing for a bookable request.
    ///
    /// Email is deliberately optional (business policy: collect it when
    /// offered, never block a booking on it).
    pub fn missing_required(&self) -> Vec<SlotName> {
        let mut missing = Vec::new();
        if self.service.is_none() {
            missing.push(SlotName::Service);
        }
        if self.date.is_none() {
            missing.push(SlotName::Date);
        }
        if self.time.is_none() {
            missing.push(SlotName::Time);
        }
        if self.client_name.is_none() {
            missing.push(SlotName::ClientName);
        }
        missing
    }

    pub fn is_bookable(&self) -> bool {
        self.missing_required().is_empty()
    }
}

// --- Intent analysis types ---

/// Closed set of intent labels the extraction pipeline may produce.
///
/// Provider output is validated against this enum; anything that does not
/// parse degrades to `GeneralInquiry`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IntentLabel {
    BookAppointment,
    CancelBooking,
    GeneralInquiry,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    #[default]
    Normal,
    High,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Negative,
    #[default]
    Neutral,
    Positive,
}

/// Raw entity strings extracted by the language-understanding service,
/// before normalization into typed slot values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    pub service: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub client_name: Option<String>,
    pub contact_email: Option<String>,
}

/// Structured result of analyzing one inbound turn.
///
/// Not persisted beyond the context's turn history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentAnalysis {
    pub intent: IntentLabel,
    /// Confidence in [0, 1].
    pub confidence: f32,
    pub entities: ExtractedEntities,
    pub missing_fields: Vec<SlotName>,
    pub urgency: Urgency,
    pub sentiment: Sentiment,
    /// True iff all mandatory slots are filled and non-contradictory.
    pub ready: bool,
    pub suggested_response: Option<String>,
}

impl IntentAnalysis {
    /// Conservative fixed result used whenever the provider fails, times
    /// out, or returns output that does not validate.
    pub fn fallback() -> Self {
        Self {
            intent: IntentLabel::GeneralInquiry,
            confidence: 0.3,
            entities: ExtractedEntities::default(),
            missing_fields: Vec::new(),
            urgency: Urgency::Normal,
            sentiment: Sentiment::Neutral,
            ready: false,
            suggested_response: None,
        }
    }

    /// Enforces the invariant that `ready` implies an empty missing-field
    /// list, demoting `ready` rather than trusting upstream output.
    pub fn enforce_ready_invariant(mut self) -> Self {
        if self.ready && !self.missing_fields.is_empty() {
            self.ready = false;
        }
        self
    }
}

// --- Consent types ---

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConsentType {
    ChannelCommunication,
    Marketing,
}

/// One append-only consent event. The latest record per (identity, type)
/// is authoritative; records are never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentRecord {
    pub identity: Identity,
    pub consent_type: ConsentType,
    pub granted: bool,
    pub recorded_at: DateTime<Utc>,
    pub purpose: Option<String>,
    /// Source channel the consent event arrived on (e.g. "whatsapp").
    pub channel: String,
}

// --- Booking types ---

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    Failed,
}

/// A committed booking. Never deleted, only status-transitioned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub client_id: String,
    pub identity: Identity,
    pub service: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: BookingStatus,
    /// Scheduling-service event id. Set before local persistence: a local
    /// row never exists without a matching external event.
    pub external_ref: Option<String>,
    pub source: String,
    pub idempotency_key: String,
    pub created_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReminderStatus {
    Pending,
    Cancelled,
}

/// A scheduled reminder notification for a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub booking_id: String,
    pub due_at: DateTime<Utc>,
    pub status: ReminderStatus,
}

/// Reference to a client record resolved by the identity directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRef {
    pub id: String,
    pub display_name: Option<String>,
}

// --- Conversation context ---

/// One completed dialogue turn kept in bounded history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub inbound: String,
    pub response: String,
    pub analysis: Option<IntentAnalysis>,
}

/// Per-identity session state with a sliding TTL.
///
/// At most one live context exists per identity. The context is discarded
/// outright (not flagged) once past expiry or once a booking completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationContext {
    pub identity: Identity,
    pub slots: SlotMap,
    pub turns: VecDeque<Turn>,
    pub last_intent: Option<IntentLabel>,
    pub created_at: DateTime<Utc>,
    pub last_touched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ConversationContext {
    pub fn new(identity: Identity, ttl: chrono::Duration) -> Self {
        let now = Utc::now();
        Self {
            identity,
            slots: SlotMap::default(),
            turns: VecDeque::new(),
            last_intent: None,
            created_at: now,
            last_touched_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Refreshes the sliding TTL after a successful turn.
    pub fn touch(&mut self, ttl: chrono::Duration) {
        let now = Utc::now();
        self.last_touched_at = now;
        self.expires_at = now + ttl;
    }

    /// Appends a turn, evicting the oldest when past [`MAX_TURNS`].
    pub fn push_turn(&mut self, turn: Turn) {
        if self.turns.len() >= MAX_TURNS {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
    }
}
