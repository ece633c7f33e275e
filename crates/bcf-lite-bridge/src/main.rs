// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! bcf-lite-bridge - companion-side relay between a BIM host and its UI
//!
//! Envelopes from the host are printed to stdout, one JSON line each.
//! Envelope lines written to stdin are forwarded to the host.

use anyhow::{Context, Result};
use bcf_lite_bridge::{BridgeConfig, Companion, CompanionExit};
use clap::{Parser, Subcommand};
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bcf-lite-bridge")]
#[command(about = "Relay BCF viewpoint messages between a BIM host and its companion UI", long_about = None)]
struct Cli {
    /// Configuration file (default: <config dir>/bcf-lite/bridge.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Relay messages over loopback TCP
    Ipc {
        /// Port this process listens on
        own_port: u16,
        /// Port the host listens on
        peer_port: u16,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => BridgeConfig::load_from(path)?,
        None => BridgeConfig::load()?,
    };

    // stdout carries the relayed envelopes
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .target(env_logger::Target::Stderr)
        .init();

    match cli.command {
        Commands::Ipc {
            own_port,
            peer_port,
        } => relay(own_port, peer_port, &config),
    }
}

fn relay(own_port: u16, peer_port: u16, config: &BridgeConfig) -> Result<()> {
    let companion = Companion::bind(own_port, peer_port)
        .with_context(|| format!("Failed to listen on port {}", own_port))?
        .with_connect_timeout(config.connect_timeout());

    log::info!(
        "Relaying between port {} and host on port {}",
        companion.port(),
        peer_port
    );

    let stdout = std::io::stdout();
    let exit = companion.run(BufReader::new(std::io::stdin()), &mut stdout.lock())?;

    match exit {
        CompanionExit::CloseRequested => log::info!("Closed by host"),
        CompanionExit::InputClosed => log::info!("Stdin closed, exiting"),
    }
    Ok(())
}
