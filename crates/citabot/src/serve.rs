// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `citabot serve` command implementation.
//!
//! Wires the SQLite store, the Anthropic provider, the channel adapter,
//! and the scheduling adapter into the dialogue engine, then runs the
//! receive loop until a shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use citabot_agent::{Engine, StoreHandles};
use citabot_anthropic::{AnthropicClient, AnthropicProvider};
use citabot_config::CitabotConfig;
use citabot_core::CitabotError;
use citabot_core::traits::ChannelAdapter;
use citabot_storage::SqliteStore;
use tracing::info;

use crate::calendar::InProcessCalendar;
use crate::console::ConsoleChannel;

/// How often expired contexts and idle identity locks are swept.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Runs the `citabot serve` command.
pub async fn run_serve(config: CitabotConfig) -> Result<(), CitabotError> {
    init_tracing(&config.agent.log_level);
    info!(agent = %config.agent.name, "starting citabot serve");

    let store = SqliteStore::open(&config.storage.database_path).await?;
    info!(path = %config.storage.database_path, "storage ready");

    let api_key = config
        .anthropic
        .api_key
        .clone()
        .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
        .ok_or_else(|| {
            CitabotError::Config(
                "anthropic.api_key is not set (config key or ANTHROPIC_API_KEY)".into(),
            )
        })?;
    let client = AnthropicClient::new(
        &api_key,
        &config.anthropic.api_version,
        &config.anthropic.model,
        Duration::from_secs(config.anthropic.request_timeout_secs),
    )?;
    let provider = Arc::new(AnthropicProvider::new(client, config.anthropic.max_tokens));

    let mut channel = ConsoleChannel::new();
    channel.connect().await?;
    let channel = Arc::new(channel);
    let scheduler = Arc::new(InProcessCalendar::new());

    let engine = Arc::new(Engine::new(
        &config,
        channel,
        provider,
        scheduler,
        StoreHandles {
            consents: Arc::new(store.clone()),
            bookings: Arc::new(store.clone()),
            clients: Arc::new(store.clone()),
            suppressions: Arc::new(store.clone()),
        },
    ));

    {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                engine.maintenance_sweep();
            }
        });
    }

    info!("citabot ready; type a message and press enter");
    tokio::select! {
        result = Arc::clone(&engine).run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            Ok(())
        }
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("citabot={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
