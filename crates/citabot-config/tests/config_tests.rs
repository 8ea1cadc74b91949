// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for config loading, validation, and diagnostics.

use citabot_config::load_and_validate_str;

#[test]
fn full_config_parses_and_validates() {
    let config = load_and_validate_str(
        r#"
        [agent]
        name = "salon"
        log_level = "debug"
        turn_deadline_secs = 20

        [channel]
        name = "whatsapp"
        send_timeout_secs = 5

        [anthropic]
        model = "claude-sonnet-4-20250514"
        max_tokens = 512
        request_timeout_secs = 10

        [scheduling]
        request_timeout_secs = 10
        alternatives_window_days = 7

        [storage]
        database_path = "/tmp/citabot-test.db"

        [session]
        ttl_minutes = 30
        lock_idle_secs = 120

        [booking]
        lookback_hours = 24
        reminder_offsets_minutes = [1440, 120, 30]
        min_confidence = 0.6

        [[booking.services]]
        name = "corte"
        duration_minutes = 30
        aliases = ["haircut"]
        "#,
    )
    .expect("config should parse");

    assert_eq!(config.agent.name, "salon");
    assert_eq!(config.booking.services.len(), 1);
    assert_eq!(config.booking.services[0].aliases, vec!["haircut"]);
}

#[test]
fn unknown_key_produces_diagnostic_with_suggestion() {
    let errors = load_and_validate_str(
        r#"
        [session]
        ttl_minuts = 30
        "#,
    )
    .unwrap_err();

    assert!(!errors.is_empty());
    let rendered = errors[0].to_string();
    assert!(rendered.contains("ttl_minuts"), "got: {rendered}");
}

#[test]
fn semantic_validation_runs_after_parse() {
    let errors = load_and_validate_str(
        r#"
        [booking]
        min_confidence = 2.0
        "#,
    )
    .unwrap_err();

    assert!(
        errors
            .iter()
            .any(|e| e.to_string().contains("min_confidence"))
    );
}
