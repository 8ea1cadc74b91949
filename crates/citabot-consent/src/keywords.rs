// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Consent keyword detection.
//!
//! Runs before any language-understanding call, so a withdrawal is honored
//! even when the provider is down.

/// Consent action expressed by a bare keyword message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentKeyword {
    Grant,
    Withdraw,
}

const GRANT_KEYWORDS: &[&str] = &["si", "sí", "yes", "start", "acepto"];
const WITHDRAW_KEYWORDS: &[&str] = &["stop", "baja", "unsubscribe", "no quiero mensajes"];

/// Classifies a message body that consists solely of a consent keyword.
///
/// Matching is case-insensitive and ignores surrounding whitespace and
/// trailing punctuation. A keyword embedded in a longer sentence does NOT
/// match; "si, a las 10" is an answer, not a consent grant.
pub fn classify(body: &str) -> Option<ConsentKeyword> {
    let trimmed = body
        .trim()
        .trim_end_matches(['.', '!', '?'])
        .trim()
        .to_lowercase();
    if trimmed.is_empty() {
        return None;
    }
    if GRANT_KEYWORDS.contains(&trimmed.as_str()) {
        Some(ConsentKeyword::Grant)
    } else if WITHDRAW_KEYWORDS.contains(&trimmed.as_str()) {
        Some(ConsentKeyword::Withdraw)
    } else {
        None
    }
}
