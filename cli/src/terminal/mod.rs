// Copyright (c) 2026 Lanwarden Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

pub mod logging;

use colored::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const BANNER: &str = r"
 _                                 _
| | __ _ _ ____      ____ _ _ __ __| | ___ _ __
| |/ _` | '_ \ \ /\ / / _` | '__/ _` |/ _ \ '_ \
| | (_| | | | \ V  V / (_| | | | (_| |  __/ | | |
|_|\__,_|_| |_|\_/\_/ \__,_|_|  \__,_|\___|_| |_|
";

pub fn init_logging(verbosity: u8) {
    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lanwarden=debug,mio=error"));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .event_format(logging::LanwardenFormatter {
            max_verbosity: verbosity,
        })
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(formatting_layer)
        .init();
}

pub fn banner() {
    eprintln!("{}", BANNER.cyan().bold());
    eprintln!("      {}\n", format!("v{}", env!("CARGO_PKG_VERSION")).dimmed());
}
