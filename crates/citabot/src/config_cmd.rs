// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `citabot config` command implementation.
//!
//! Prints the effective merged configuration with secrets redacted.

use citabot_config::CitabotConfig;
use citabot_core::CitabotError;

pub fn run(config: &CitabotConfig) -> Result<(), CitabotError> {
    println!("{}", render(config)?);
    Ok(())
}

fn render(config: &CitabotConfig) -> Result<String, CitabotError> {
    let mut redacted = config.clone();
    if redacted.anthropic.api_key.is_some() {
        redacted.anthropic.api_key = Some("[redacted]".to_string());
    }
    toml::to_string_pretty(&redacted)
        .map_err(|e| CitabotError::Config(format!("failed to render config: {e}")))
}
