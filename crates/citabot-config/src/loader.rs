// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./citabot.toml` > `~/.config/citabot/citabot.toml` > `/etc/citabot/citabot.toml`
//! with environment variable overrides via `CITABOT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::CitabotConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/citabot/citabot.toml` (system-wide)
/// 3. `~/.config/citabot/citabot.toml` (user XDG config)
/// 4. `./citabot.toml` (local directory)
/// 5. `CITABOT_*` environment variables
pub fn load_config() -> Result<CitabotConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<CitabotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CitabotConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CitabotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CitabotConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CitabotConfig::default()))
        .merge(Toml::file("/etc/citabot/citabot.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("citabot/citabot.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("citabot.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// CRITICAL: Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `CITABOT_ANTHROPIC_API_KEY` must
/// map to `anthropic.api_key`, not `anthropic.api.key`.
fn env_provider() -> Env {
    Env::prefixed("CITABOT_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: CITABOT_ANTHROPIC_API_KEY -> "anthropic_api_key"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("channel_", "channel.", 1)
            .replacen("anthropic_", "anthropic.", 1)
            .replacen("scheduling_", "scheduling.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("session_", "session.", 1)
            .replacen("booking_", "booking.", 1);
        mapped.into()
    })
}
