// Copyright (c) 2026 Lanwarden Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! Network interface selection.
//!
//! The daemon speaks raw ARP on exactly one interface. The operator can
//! pin it by name; otherwise the first viable LAN interface wins, wired
//! names sorting before wireless ones.

use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::IpNetwork;

use crate::info;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ViabilityError {
    /// The interface is operationally down.
    IsDown,
    /// Loopback cannot carry ARP for other hosts.
    IsLoopback,
    /// The interface does not have a MAC address.
    NoMacAddress,
    /// The interface does not support broadcast (required for ARP).
    NotBroadcast,
    /// The interface is a point-to-point link (e.g. a VPN).
    IsPointToPoint,
    /// The interface has no private IPv4 address to scan from.
    NoPrivateIpv4,
}

/// Resolves the interface to operate on.
///
/// With an explicit name, that interface must exist and be viable; with
/// none, the viable candidates are ranked and the best one is picked.
pub fn select(name: Option<&str>) -> anyhow::Result<NetworkInterface> {
    let interfaces: Vec<NetworkInterface> = datalink::interfaces();

    if let Some(wanted) = name {
        let interface: NetworkInterface = interfaces
            .into_iter()
            .find(|i| i.name == wanted)
            .ok_or_else(|| anyhow::anyhow!("interface {wanted} not found"))?;

        if let Err(reason) = is_viable_lan_interface(&interface) {
            anyhow::bail!("interface {wanted} unusable for ARP: {reason:?}");
        }
        return Ok(interface);
    }

    info!(
        verbosity = 1,
        "Identified {} network interfaces, picking the best one",
        interfaces.len()
    );

    let mut candidates: Vec<NetworkInterface> = interfaces
        .into_iter()
        .filter(|i| is_viable_lan_interface(i).is_ok())
        .collect();

    // Wired naming conventions (eth*, en*) sort ahead of wlan*.
    candidates.sort_by_key(|i| if i.name.starts_with('e') { 0 } else { 1 });

    candidates
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("no interfaces available for LAN control"))
}

pub fn is_viable_lan_interface(interface: &NetworkInterface) -> Result<(), ViabilityError> {
    if !interface.is_up() {
        return Err(ViabilityError::IsDown);
    }
    if interface.is_loopback() {
        return Err(ViabilityError::IsLoopback);
    }
    if interface.mac.is_none() {
        return Err(ViabilityError::NoMacAddress);
    }
    if !interface.is_broadcast() {
        return Err(ViabilityError::NotBroadcast);
    }
    if interface.is_point_to_point() {
        return Err(ViabilityError::IsPointToPoint);
    }

    let has_private_v4 = interface.ips.iter().any(|net| match net {
        IpNetwork::V4(v4) => v4.ip().is_private(),
        IpNetwork::V6(_) => false,
    });
    if !has_private_v4 {
        return Err(ViabilityError::NoPrivateIpv4);
    }

    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
