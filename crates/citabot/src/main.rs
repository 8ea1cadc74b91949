// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Citabot - a conversational booking assistant for salons.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};

mod calendar;
mod config_cmd;
mod console;
mod serve;

/// Citabot - a conversational booking assistant for salons.
#[derive(Parser, Debug)]
#[command(name = "citabot", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the booking assistant.
    Serve,
    /// Print the effective merged configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match citabot_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            citabot_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("citabot serve failed: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => {
            if let Err(e) = config_cmd::run(&config) {
                eprintln!("citabot config failed: {e}");
                std::process::exit(1);
            }
        }
        None => {
            println!("citabot: use --help for available commands");
        }
    }
}
