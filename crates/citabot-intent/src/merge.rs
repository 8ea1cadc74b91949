// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Slot-filling and readiness evaluation.
//!
//! Merges one turn's extracted entities into the accumulated slot map.
//! Last-write-wins per field: an existing value is kept unless the new
//! turn supplies a non-empty replacement. The one deliberate exception is
//! the service slot: changing service clears date and time, because those
//! were chosen against the previous service's availability.

use chrono::NaiveDate;
use citabot_core::types::{ConversationContext, IntentAnalysis, SlotName};
use tracing::debug;

use crate::dates;
use crate::prefilter::ServiceCatalog;

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub missing: Vec<SlotName>,
    pub ready: bool,
    /// True when this turn switched services and invalidated date/time.
    pub service_changed: bool,
}

/// Merges an analysis result into the context's slot map and re-evaluates
/// readiness. `today` anchors relative date normalization.
pub fn merge(
    catalog: &ServiceCatalog,
    context: &mut ConversationContext,
    analysis: &IntentAnalysis,
    today: NaiveDate,
) -> MergeOutcome {
    let mut service_changed = false;

    // Only catalog services are accepted; an unresolvable mention leaves
    // the slot untouched so the dialogue re-prompts with the real options.
    if let Some(ref raw) = analysis.entities.service
        && let Some(canonical) = catalog.resolve(raw)
    {
        let changed = context
            .slots
            .service
            .as_deref()
            .is_some_and(|current| current != canonical);
        if changed {
            debug!(
                from = context.slots.service.as_deref(),
                to = canonical,
                "service changed, clearing dependent date/time slots"
            );
            context.slots.date = None;
            context.slots.time = None;
            service_changed = true;
        }
        context.slots.service = Some(canonical.to_string());
    }

    if let Some(ref raw) = analysis.entities.date
        && let Some(date) = dates::parse_date(raw, today)
    {
        context.slots.date = Some(date);
    }

    if let Some(ref raw) = analysis.entities.time
        && let Some(time) = dates::parse_time(raw)
    {
        context.slots.time = Some(time);
    }

    if let Some(ref name) = analysis.entities.client_name {
        let trimmed = name.trim();
        if !trimmed.is_empty() {
            context.slots.client_name = Some(trimmed.to_string());
        }
    }

    if let Some(ref email) = analysis.entities.contact_email {
        let trimmed = email.trim();
        if trimmed.contains('@') {
            context.slots.contact_email = Some(trimmed.to_string());
        }
    }

    context.last_intent = Some(analysis.intent);

    let missing = context.slots.missing_required();
    let ready = missing.is_empty();
    MergeOutcome {
        missing,
        ready,
        service_changed,
    }
}
