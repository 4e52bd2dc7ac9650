// Copyright (c) 2026 Lanwarden Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! Daemon entry point.
//!
//! Wires the pieces together in dependency order: persisted state, the
//! network interface, the raw-socket link, the controller, and finally
//! the HTTP API. Errors anywhere in that chain are fatal; once serving,
//! the process runs until Ctrl-C and heals ARP caches on the way out.

mod commands;
mod terminal;

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use lanwarden_common::config::AppConfig;
use lanwarden_common::{error, info, interface};
use lanwarden_core::control::Controller;
use lanwarden_core::link::{LinkLayer, PnetLink};

use crate::commands::CommandLine;

#[tokio::main]
async fn main() -> ExitCode {
    let commands = CommandLine::parse_args();
    terminal::init_logging(commands.verbosity);

    if !commands.no_banner {
        terminal::banner();
    }

    match run(&commands).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Critical failure: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(commands: &CommandLine) -> anyhow::Result<()> {
    if !is_root::is_root() {
        anyhow::bail!("raw sockets require root privileges, re-run with sudo");
    }

    let config: AppConfig = AppConfig::load_or_default(&commands.config)?;

    let interface = interface::select(commands.interface.as_deref())?;
    let link: Arc<dyn LinkLayer> = Arc::new(PnetLink::new(interface)?);
    let controller: Arc<Controller> = Controller::new(link, config, commands.config.clone());

    let addr = SocketAddr::new(commands.bind, commands.port);
    lanwarden_api::serve(addr, controller, shutdown_signal()).await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        error!("Could not listen for the interrupt signal");
        return;
    }
    info!("Interrupt received");
}
