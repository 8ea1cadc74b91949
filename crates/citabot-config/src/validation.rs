// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths, positive timeouts, and a coherent
//! service catalog.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::CitabotConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CitabotConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.agent.turn_deadline_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "agent.turn_deadline_secs must be positive".to_string(),
        });
    }

    if config.session.ttl_minutes <= 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "session.ttl_minutes must be positive, got {}",
                config.session.ttl_minutes
            ),
        });
    }

    if !(0.0..=1.0).contains(&config.booking.min_confidence) {
        errors.push(ConfigError::Validation {
            message: format!(
                "booking.min_confidence must be in [0, 1], got {}",
                config.booking.min_confidence
            ),
        });
    }

    if config.booking.lookback_hours <= 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "booking.lookback_hours must be positive, got {}",
                config.booking.lookback_hours
            ),
        });
    }

    if config.scheduling.alternatives_window_days <= 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "scheduling.alternatives_window_days must be positive, got {}",
                config.scheduling.alternatives_window_days
            ),
        });
    }

    if config.booking.services.is_empty() {
        errors.push(ConfigError::Validation {
            message: "booking.services must list at least one service".to_string(),
        });
    }

    let mut seen_names = HashSet::new();
    for (i, service) in config.booking.services.iter().enumerate() {
        if service.name.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("booking.services[{i}].name must not be empty"),
            });
        }
        if !seen_names.insert(service.name.to_lowercase()) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "duplicate service name `{}` in booking.services",
                    service.name
                ),
            });
        }
        if service.duration_minutes <= 0 {
            errors.push(ConfigError::Validation {
                message: format!(
                    "booking.services[{i}].duration_minutes must be positive, got {}",
                    service.duration_minutes
                ),
            });
        }
    }

    for (i, offset) in config.booking.reminder_offsets_minutes.iter().enumerate() {
        if *offset <= 0 {
            errors.push(ConfigError::Validation {
                message: format!(
                    "booking.reminder_offsets_minutes[{i}] must be positive, got {offset}"
                ),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
