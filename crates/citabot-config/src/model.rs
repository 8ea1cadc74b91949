// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Citabot booking assistant.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Citabot configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CitabotConfig {
    /// Assistant identity and turn-handling settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Messaging channel settings.
    #[serde(default)]
    pub channel: ChannelConfig,

    /// Anthropic API settings (language-understanding provider).
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// External scheduling service settings.
    #[serde(default)]
    pub scheduling: SchedulingConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Conversation session store settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Booking orchestration settings.
    #[serde(default)]
    pub booking: BookingConfig,
}

/// Assistant identity and turn-handling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Overall per-turn deadline in seconds. On expiry the user gets a
    /// fixed technical-issue fallback instead of silence.
    #[serde(default = "default_turn_deadline_secs")]
    pub turn_deadline_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            turn_deadline_secs: default_turn_deadline_secs(),
        }
    }
}

fn default_agent_name() -> String {
    "citabot".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_turn_deadline_secs() -> u64 {
    30
}

/// Messaging channel configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfig {
    /// Channel name recorded on consent events (e.g. "whatsapp").
    #[serde(default = "default_channel_name")]
    pub name: String,

    /// Outbound send timeout in seconds.
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            name: default_channel_name(),
            send_timeout_secs: default_send_timeout_secs(),
        }
    }
}

fn default_channel_name() -> String {
    "whatsapp".to_string()
}

fn default_send_timeout_secs() -> u64 {
    5
}

/// Anthropic API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// Anthropic API key. `None` requires environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model to use for analysis requests.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Anthropic API version string.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_provider_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            api_version: default_api_version(),
            request_timeout_secs: default_provider_timeout_secs(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_provider_timeout_secs() -> u64 {
    10
}

/// External scheduling service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulingConfig {
    /// Per-call timeout in seconds for availability and mutation calls.
    #[serde(default = "default_scheduling_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Window (in days) scanned for alternative slots when the requested
    /// slot is unavailable.
    #[serde(default = "default_alternatives_window_days")]
    pub alternatives_window_days: i64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_scheduling_timeout_secs(),
            alternatives_window_days: default_alternatives_window_days(),
        }
    }
}

fn default_scheduling_timeout_secs() -> u64 {
    10
}

fn default_alternatives_window_days() -> i64 {
    7
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "citabot.db".to_string()
}

/// Conversation session store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Sliding idle TTL for conversation contexts, in minutes.
    #[serde(default = "default_session_ttl_minutes")]
    pub ttl_minutes: i64,

    /// Idle time after which unused per-identity lock entries are expired.
    #[serde(default = "default_lock_idle_secs")]
    pub lock_idle_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_session_ttl_minutes(),
            lock_idle_secs: default_lock_idle_secs(),
        }
    }
}

fn default_session_ttl_minutes() -> i64 {
    30
}

fn default_lock_idle_secs() -> u64 {
    300
}

/// A bookable service with its duration and recognized aliases.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub name: String,
    pub duration_minutes: i64,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Booking orchestration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BookingConfig {
    /// Catalog of bookable services recognized by the pre-filter.
    #[serde(default = "default_services")]
    pub services: Vec<ServiceConfig>,

    /// Idempotency-key lookback window in hours.
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: i64,

    /// Reminder offsets before the appointment start, in minutes.
    #[serde(default = "default_reminder_offsets_minutes")]
    pub reminder_offsets_minutes: Vec<i64>,

    /// Minimum analysis confidence below which the assistant asks a
    /// clarifying question instead of acting.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            services: default_services(),
            lookback_hours: default_lookback_hours(),
            reminder_offsets_minutes: default_reminder_offsets_minutes(),
            min_confidence: default_min_confidence(),
        }
    }
}

fn default_services() -> Vec<ServiceConfig> {
    vec![
        ServiceConfig {
            name: "corte".to_string(),
            duration_minutes: 30,
            aliases: vec!["corte de pelo".to_string(), "haircut".to_string()],
        },
        ServiceConfig {
            name: "tinte".to_string(),
            duration_minutes: 90,
            aliases: vec!["color".to_string(), "coloracion".to_string()],
        },
        ServiceConfig {
            name: "manicura".to_string(),
            duration_minutes: 45,
            aliases: vec!["manicure".to_string(), "unas".to_string()],
        },
        ServiceConfig {
            name: "peinado".to_string(),
            duration_minutes: 40,
            aliases: vec!["blowout".to_string()],
        },
    ]
}

fn default_lookback_hours() -> i64 {
    24
}

fn default_reminder_offsets_minutes() -> Vec<i64> {
    vec![1440, 120, 30]
}

fn default_min_confidence() -> f32 {
    0.6
}
