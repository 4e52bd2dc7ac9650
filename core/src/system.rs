// Copyright (c) 2026 Lanwarden Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! Host routing-table access.
//!
//! The gateway's IP comes from the kernel's IPv4 routing table at
//! `/proc/net/route`. Columns are tab separated; `Destination` and
//! `Gateway` are little-endian hex words, so `0102A8C0` reads back as
//! 192.168.2.1.

use std::fs;
use std::net::Ipv4Addr;

use anyhow::Context;

const PROC_ROUTE_PATH: &str = "/proc/net/route";

/// The default gateway for `interface`.
///
/// A default route bound to the given interface wins; failing that, any
/// default route is accepted (the route may live on a bridge or vlan
/// parent while frames still flow through our interface).
pub fn default_gateway(interface: &str) -> anyhow::Result<Ipv4Addr> {
    let table: String = fs::read_to_string(PROC_ROUTE_PATH)
        .with_context(|| format!("reading {PROC_ROUTE_PATH}"))?;

    parse_default_gateway(&table, interface)
        .ok_or_else(|| anyhow::anyhow!("no IPv4 default route found for {interface}"))
}

fn parse_default_gateway(table: &str, interface: &str) -> Option<Ipv4Addr> {
    let mut fallback: Option<Ipv4Addr> = None;

    for line in table.lines().skip(1) {
        // Expected columns: Iface Destination Gateway Flags ...
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 3 {
            continue;
        }

        let (iface, destination, gateway) = (cols[0], cols[1], cols[2]);
        if destination != "00000000" {
            continue;
        }

        let raw: u32 = match u32::from_str_radix(gateway, 16) {
            Ok(v) => v,
            Err(_) => continue,
        };

        let addr = Ipv4Addr::from(raw.to_le_bytes());
        if addr.is_unspecified() {
            continue;
        }

        if iface == interface {
            return Some(addr);
        }
        fallback.get_or_insert(addr);
    }

    fallback
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
