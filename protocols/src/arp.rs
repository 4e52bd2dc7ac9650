// Copyright (c) 2026 Lanwarden Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! ARP frame builders and accessors.
//!
//! `create_request` produces the broadcast who-has probes used by the
//! subnet sweep. `create_reply` produces unicast is-at frames and serves
//! two roles: with our own MAC as the claimed sender it poisons a cache
//! (spoofing), with the true owner's MAC it heals one (restoration).
//! Which role a frame plays is entirely in the arguments.

use std::net::Ipv4Addr;

use anyhow::Context;
use pnet::datalink::MacAddr;
use pnet::packet::Packet;
use pnet::packet::arp::{ArpHardwareTypes, ArpOperation, ArpOperations, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket};

use crate::ethernet;
use crate::utils::{ARP_LEN, MIN_ETH_FRAME_NO_FCS};

/// A broadcast who-has request asking the owner of `dst_addr` to answer.
pub fn create_request(
    src_mac: MacAddr,
    src_addr: Ipv4Addr,
    dst_addr: Ipv4Addr,
) -> anyhow::Result<Vec<u8>> {
    build_frame(
        src_mac,
        MacAddr::broadcast(),
        ArpOperations::Request,
        src_mac,
        src_addr,
        MacAddr::zero(),
        dst_addr,
    )
}

/// A unicast is-at reply claiming `sender_addr` lives at `sender_mac`.
///
/// `src_mac` is the Ethernet source (always our interface); the claim the
/// receiver caches is the sender pair inside the ARP payload.
pub fn create_reply(
    src_mac: MacAddr,
    dst_mac: MacAddr,
    sender_mac: MacAddr,
    sender_addr: Ipv4Addr,
    target_mac: MacAddr,
    target_addr: Ipv4Addr,
) -> anyhow::Result<Vec<u8>> {
    build_frame(
        src_mac,
        dst_mac,
        ArpOperations::Reply,
        sender_mac,
        sender_addr,
        target_mac,
        target_addr,
    )
}

#[allow(clippy::too_many_arguments)]
fn build_frame(
    src_mac: MacAddr,
    dst_mac: MacAddr,
    operation: ArpOperation,
    sender_mac: MacAddr,
    sender_addr: Ipv4Addr,
    target_mac: MacAddr,
    target_addr: Ipv4Addr,
) -> anyhow::Result<Vec<u8>> {
    let eth_header: Vec<u8> = ethernet::make_header(src_mac, dst_mac, EtherTypes::Arp)?;

    let mut arp_buffer: [u8; ARP_LEN] = [0u8; ARP_LEN];
    {
        let mut arp_packet: MutableArpPacket = MutableArpPacket::new(&mut arp_buffer)
            .context("failed to create mutable ARP packet")?;
        arp_packet.set_hardware_type(ArpHardwareTypes::Ethernet);
        arp_packet.set_protocol_type(EtherTypes::Ipv4);
        arp_packet.set_hw_addr_len(6);
        arp_packet.set_proto_addr_len(4);
        arp_packet.set_operation(operation);
        arp_packet.set_sender_hw_addr(sender_mac);
        arp_packet.set_sender_proto_addr(sender_addr);
        arp_packet.set_target_hw_addr(target_mac);
        arp_packet.set_target_proto_addr(target_addr);
    }

    let mut final_packet: Vec<u8> = Vec::with_capacity(MIN_ETH_FRAME_NO_FCS);

    final_packet.extend_from_slice(&eth_header);
    final_packet.extend_from_slice(&arp_buffer);
    final_packet.resize(MIN_ETH_FRAME_NO_FCS, 0u8);

    Ok(final_packet)
}

/// Extracts `(sender_mac, sender_ip)` from an ARP reply frame.
///
/// Returns `None` for ARP traffic that is not a reply (requests flood any
/// busy LAN); errors only on truncated payloads.
pub fn get_reply_sender(eth_packet: &EthernetPacket) -> anyhow::Result<Option<(MacAddr, Ipv4Addr)>> {
    let arp_packet: ArpPacket = ArpPacket::new(eth_packet.payload()).context(format!(
        "truncated or invalid ARP packet (payload len {})",
        eth_packet.payload().len()
    ))?;

    if arp_packet.get_operation() != ArpOperations::Reply {
        return Ok(None);
    }

    Ok(Some((
        arp_packet.get_sender_hw_addr(),
        arp_packet.get_sender_proto_addr(),
    )))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
