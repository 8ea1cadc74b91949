// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed response templates, in the salon's language.
//!
//! Consent and failure turns deliberately bypass the language provider,
//! so their wording lives here rather than in any prompt.

use chrono::{DateTime, Utc};
use citabot_core::types::{Booking, SlotName};

/// Sent to any identity without a consent grant. Fixed and non-LLM by
/// design: no extraction has run at this point.
pub const CONSENT_PROMPT: &str = "¡Hola! Soy el asistente de reservas del salón. \
    Para poder atenderte por este canal necesito tu consentimiento. \
    Responde SI para aceptar, o STOP para no recibir más mensajes.";

pub const CONSENT_GRANTED: &str = "¡Gracias! Ya puedes pedirme cita. \
    ¿Qué servicio te interesa y para cuándo?";

/// Final acknowledgment after a withdrawal. The last message we send.
pub const CONSENT_WITHDRAWN: &str = "Entendido, no recibirás más mensajes nuestros. \
    Puedes volver a escribir START si cambias de opinión.";

/// Fallback when the turn deadline expires or an internal error escapes.
pub const TECHNICAL_ISSUE: &str = "Estamos teniendo un problema técnico. \
    Por favor, inténtalo de nuevo en unos minutos o llámanos directamente.";

pub const CLARIFY: &str = "Perdona, no te he entendido bien. \
    ¿Quieres reservar una cita? Dime el servicio y el día que prefieres.";

pub const BOOKING_FAILED: &str = "Ahora mismo no puedo confirmar la reserva. \
    Inténtalo de nuevo en un momento o llámanos al salón.";

pub const NO_ACTIVE_BOOKING: &str = "No encuentro ninguna cita activa a tu nombre. \
    ¿Quieres reservar una?";

fn slot_phrase(slot: &SlotName) -> &'static str {
    match slot {
        SlotName::Service => "qué servicio quieres",
        SlotName::Date => "qué día te viene bien",
        SlotName::Time => "a qué hora",
        SlotName::ClientName => "tu nombre",
        SlotName::ContactEmail => "tu email",
    }
}

/// Asks for the missing required slots in one message.
pub fn ask_missing(missing: &[SlotName]) -> String {
    let phrases: Vec<&str> = missing.iter().map(slot_phrase).collect();
    match phrases.as_slice() {
        [] => CLARIFY.to_string(),
        [one] => format!("¡Genial! Solo me falta saber {one}."),
        rest => {
            let (last, init) = rest.split_last().unwrap_or((&"", &[]));
            format!("Perfecto. Dime {} y {last}.", init.join(", "))
        }
    }
}

fn format_slot(start: &DateTime<Utc>) -> String {
    start.format("%d/%m/%Y a las %H:%M").to_string()
}

pub fn booking_confirmed(booking: &Booking) -> String {
    format!(
        "¡Cita confirmada! {} el {}. Te enviaremos un recordatorio antes. \
         Si necesitas cambiarla, escríbeme.",
        booking.service,
        format_slot(&booking.starts_at)
    )
}

pub fn no_availability(alternatives: &[DateTime<Utc>]) -> String {
    if alternatives.is_empty() {
        return "Lo siento, esa hora está ocupada y no veo huecos cercanos. \
                ¿Quieres probar con otra fecha?"
            .to_string();
    }
    let listed: Vec<String> = alternatives.iter().map(format_slot).collect();
    format!(
        "Lo siento, esa hora está ocupada. Tengo hueco: {}. ¿Te viene bien alguna?",
        listed.join(", ")
    )
}

pub fn booking_cancelled(booking: &Booking) -> String {
    format!(
        "Tu cita de {} el {} queda anulada. ¡Esperamos verte pronto!",
        booking.service,
        format_slot(&booking.starts_at)
    )
}
