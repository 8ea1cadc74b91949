// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Analysis tool schema and validation of provider output.
//!
//! The provider is untrusted: every field of the structured reply is
//! re-validated against the closed enums here, and anything that does not
//! parse degrades field-by-field to a conservative default instead of
//! failing the turn.

use citabot_core::types::{
    ExtractedEntities, IntentAnalysis, IntentLabel, Sentiment, SlotName, Urgency,
};
use serde_json::Value;
use tracing::debug;

/// JSON Schema for the structured analysis the provider is asked to emit.
pub fn analysis_schema(service_names: &[String]) -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "intent": {
                "type": "string",
                "enum": ["book_appointment", "cancel_booking", "general_inquiry"]
            },
            "confidence": {"type": "number", "minimum": 0.0, "maximum": 1.0},
            "entities": {
                "type": "object",
                "properties": {
                    "service": {"type": "string", "description":
                        format!("One of: {}", service_names.join(", "))},
                    "date": {"type": "string", "description":
                        "Date as mentioned by the client, verbatim"},
                    "time": {"type": "string", "description":
                        "Time as mentioned by the client, verbatim"},
                    "client_name": {"type": "string"},
                    "contact_email": {"type": "string"}
                }
            },
            "missing_fields": {
                "type": "array",
                "items": {"type": "string",
                    "enum": ["service", "date", "time", "client_name", "contact_email"]}
            },
            "urgency": {"type": "string", "enum": ["low", "normal", "high"]},
            "sentiment": {"type": "string", "enum": ["negative", "neutral", "positive"]},
            "ready": {"type": "boolean"},
            "suggested_response": {"type": "string", "description":
                "Short reply to the client, in the client's language"}
        },
        "required": ["intent", "confidence", "ready"]
    })
}

/// System prompt for the analysis call.
pub fn system_prompt(service_names: &[String], prefilter_note: &str) -> String {
    format!(
        "You analyze WhatsApp messages sent to a hair salon and extract booking \
         intent. Clients mostly write Spanish; some write English. The salon \
         offers exactly these services: {}. Extract entities verbatim as the \
         client wrote them. Never invent a service the client did not mention. \
         {}Reply only by calling the record_analysis tool.",
        service_names.join(", "),
        prefilter_note,
    )
}

fn parse_or_default<T: std::str::FromStr + Default>(value: Option<&Value>, field: &str) -> T {
    match value.and_then(Value::as_str).map(str::parse::<T>) {
        Some(Ok(parsed)) => parsed,
        Some(Err(_)) => {
            debug!(field, "provider returned unparseable enum value, using default");
            T::default()
        }
        None => T::default(),
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Validates a structured provider reply into an [`IntentAnalysis`].
///
/// Returns None only when the top-level shape is unusable (not an object,
/// or an intent that does not parse); individual bad fields degrade to
/// defaults.
pub fn validate_analysis(value: &Value) -> Option<IntentAnalysis> {
    let obj = value.as_object()?;

    let intent: IntentLabel = obj.get("intent")?.as_str()?.parse().ok()?;
    let confidence = obj
        .get("confidence")
        .and_then(Value::as_f64)
        .map(|c| c.clamp(0.0, 1.0) as f32)?;

    let entities = obj
        .get("entities")
        .and_then(Value::as_object)
        .map(|e| ExtractedEntities {
            service: non_empty_string(e.get("service")),
            date: non_empty_string(e.get("date")),
            time: non_empty_string(e.get("time")),
            client_name: non_empty_string(e.get("client_name")),
            contact_email: non_empty_string(e.get("contact_email")),
        })
        .unwrap_or_default();

    let missing_fields = obj
        .get("missing_fields")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .filter_map(|s| s.parse::<SlotName>().ok())
                .collect()
        })
        .unwrap_or_default();

    let analysis = IntentAnalysis {
        intent,
        confidence,
        entities,
        missing_fields,
        urgency: parse_or_default::<Urgency>(obj.get("urgency"), "urgency"),
        sentiment: parse_or_default::<Sentiment>(obj.get("sentiment"), "sentiment"),
        ready: obj.get("ready").and_then(Value::as_bool).unwrap_or(false),
        suggested_response: non_empty_string(obj.get("suggested_response")),
    };
    Some(analysis.enforce_ready_invariant())
}
