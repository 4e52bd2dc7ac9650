// Copyright (c) 2026 Lanwarden Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! Command line schema.
//!
//! The daemon has a single mode of operation, so everything here is a
//! flag; validation of values that need network context (interface names,
//! bind addresses already in use) happens at startup, not in `clap`.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{ArgAction, Parser};

use lanwarden_common::config::DEFAULT_CONFIG_FILE;

#[derive(Parser)]
#[command(name = "lanwarden")]
#[command(about = "LAN access control daemon with preset time windows.")]
#[command(version)]
pub struct CommandLine {
    /// Network interface to operate on (auto-detected when omitted)
    #[arg(short = 'i', long = "interface")]
    pub interface: Option<String>,

    /// Address the control API binds to
    #[arg(short = 'b', long = "bind", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Port the control API listens on
    #[arg(short = 'p', long = "port", default_value_t = 8000)]
    pub port: u16,

    /// Path of the persisted state document
    #[arg(short = 'c', long = "config", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Keep logs and colors but hide the ASCII art
    #[arg(long = "no-banner")]
    pub no_banner: bool,

    /// Increase logging detail (-v: debug logs, -vv: per-frame detail)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbosity: u8,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
