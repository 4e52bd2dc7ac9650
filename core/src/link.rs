// Copyright (c) 2026 Lanwarden Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! The seam between the control logic and the wire.
//!
//! Everything above this module talks to [`LinkLayer`]; only [`PnetLink`]
//! touches raw sockets. Tests swap in a scripted implementation.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use pnet::datalink::{DataLinkSender, MacAddr, NetworkInterface};
use pnet::ipnetwork::IpNetwork;
use pnet::packet::ethernet::EtherTypes;
use tokio::sync::Mutex;

use lanwarden_common::models::device::Device;
use lanwarden_common::{debug, info};
use lanwarden_protocols::{arp, ethernet};

use crate::network::channel::{self, EthernetHandle};
use crate::system;

/// How long a subnet sweep listens for replies before giving up.
const SCAN_TIMEOUT_SECS: u64 = 3;
/// Pacing between ARP probes so the sweep does not burst 253 frames at once.
const PROBE_PACE_MS: u64 = 1;
/// Probes sent when resolving a single address, in case one is lost.
const SINGLE_PROBE_REPEAT: usize = 3;

/// Condition that ends a sweep before its deadline.
#[derive(Clone, Copy)]
enum SweepStop {
    Mac(MacAddr),
    Ip(Ipv4Addr),
}

/// Link-layer operations the controller and spoof engine depend on.
#[async_trait]
pub trait LinkLayer: Send + Sync {
    /// The MAC of the interface we operate on.
    fn local_mac(&self) -> MacAddr;

    /// The IPv4 default gateway for our interface.
    fn default_gateway(&self) -> anyhow::Result<Ipv4Addr>;

    /// Puts one raw Ethernet frame on the wire.
    async fn send_frame(&self, frame: &[u8]) -> anyhow::Result<()>;

    /// Sweeps the local /24 and returns every device that answered,
    /// sorted by IP.
    async fn scan_subnet(&self) -> anyhow::Result<Vec<Device>>;

    /// Resolves a MAC to its current IPv4 address, if the device is on
    /// the LAN right now.
    async fn lookup_mac(&self, mac: MacAddr) -> anyhow::Result<Option<Ipv4Addr>>;

    /// Resolves an IPv4 address to the MAC currently claiming it.
    async fn lookup_ip(&self, ip: Ipv4Addr) -> anyhow::Result<Option<MacAddr>>;
}

/// Production [`LinkLayer`] backed by a `pnet` datalink channel.
pub struct PnetLink {
    interface: NetworkInterface,
    mac: MacAddr,
    ip: Ipv4Addr,
    tx: Mutex<Box<dyn DataLinkSender>>,
}

impl PnetLink {
    pub fn new(interface: NetworkInterface) -> anyhow::Result<Self> {
        let mac: MacAddr = interface
            .mac
            .with_context(|| format!("interface {} has no MAC address", interface.name))?;

        let ip: Ipv4Addr = interface
            .ips
            .iter()
            .find_map(|net| match net {
                IpNetwork::V4(v4) if v4.ip().is_private() => Some(v4.ip()),
                _ => None,
            })
            .with_context(|| format!("interface {} has no private IPv4", interface.name))?;

        let (tx, _rx) = channel::open_eth_channel(&interface)?;

        info!(
            "Operating on {} ({mac}, {ip})",
            interface.name
        );

        Ok(Self {
            interface,
            mac,
            ip,
            tx: Mutex::new(tx),
        })
    }

    /// Sends who-has probes for every address in `probes` and collects
    /// is-at replies until the deadline, or until `stop_on` answers.
    async fn arp_sweep(
        &self,
        probes: Vec<Ipv4Addr>,
        stop_on: Option<SweepStop>,
    ) -> anyhow::Result<Vec<Device>> {
        let mut handle: EthernetHandle = channel::start_capture(&self.interface)?;

        let mut pending = probes.into_iter();
        let mut found: HashMap<MacAddr, Device> = HashMap::new();

        let deadline = tokio::time::sleep(Duration::from_secs(SCAN_TIMEOUT_SECS));
        tokio::pin!(deadline);
        let mut pace = tokio::time::interval(Duration::from_millis(PROBE_PACE_MS));

        loop {
            tokio::select! {
                () = &mut deadline => break,
                _ = pace.tick() => {
                    if let Some(dst) = pending.next() {
                        let probe: Vec<u8> = arp::create_request(self.mac, self.ip, dst)?;
                        self.send_frame(&probe).await?;
                    }
                }
                frame = handle.rx.recv() => {
                    let Some(frame) = frame else { break };
                    let Ok(eth) = ethernet::get_packet_from_u8(&frame) else {
                        continue;
                    };
                    if eth.get_ethertype() != EtherTypes::Arp {
                        continue;
                    }
                    let Ok(Some((mac, ip))) = arp::get_reply_sender(&eth) else {
                        continue;
                    };
                    // Our own probes echo back on some drivers.
                    if mac == self.mac {
                        continue;
                    }
                    found.entry(mac).or_insert_with(|| Device::new(mac, ip));
                    let done = match stop_on {
                        Some(SweepStop::Mac(wanted)) => mac == wanted,
                        Some(SweepStop::Ip(wanted)) => ip == wanted,
                        None => false,
                    };
                    if done {
                        break;
                    }
                }
            }
        }

        let mut devices: Vec<Device> = found.into_values().collect();
        devices.sort_by_key(|d| d.ip);
        debug!(verbosity = 1, "Sweep finished: {} devices answered", devices.len());
        Ok(devices)
    }
}

#[async_trait]
impl LinkLayer for PnetLink {
    fn local_mac(&self) -> MacAddr {
        self.mac
    }

    fn default_gateway(&self) -> anyhow::Result<Ipv4Addr> {
        system::default_gateway(&self.interface.name)
    }

    async fn send_frame(&self, frame: &[u8]) -> anyhow::Result<()> {
        let mut tx = self.tx.lock().await;
        match tx.send_to(frame, None) {
            Some(result) => result.context("sending raw frame"),
            None => anyhow::bail!("datalink sender rejected the frame"),
        }
    }

    async fn scan_subnet(&self) -> anyhow::Result<Vec<Device>> {
        self.arp_sweep(subnet_hosts(self.ip), None).await
    }

    async fn lookup_mac(&self, mac: MacAddr) -> anyhow::Result<Option<Ipv4Addr>> {
        let devices: Vec<Device> = self
            .arp_sweep(subnet_hosts(self.ip), Some(SweepStop::Mac(mac)))
            .await?;
        Ok(devices.into_iter().find(|d| d.mac == mac).map(|d| d.ip))
    }

    async fn lookup_ip(&self, ip: Ipv4Addr) -> anyhow::Result<Option<MacAddr>> {
        let devices: Vec<Device> = self
            .arp_sweep(vec![ip; SINGLE_PROBE_REPEAT], Some(SweepStop::Ip(ip)))
            .await?;
        Ok(devices.into_iter().find(|d| d.ip == ip).map(|d| d.mac))
    }
}

/// Every host address in `local`'s /24, excluding `local` itself.
fn subnet_hosts(local: Ipv4Addr) -> Vec<Ipv4Addr> {
    let [a, b, c, _] = local.octets();
    (1..=254)
        .map(|d| Ipv4Addr::new(a, b, c, d))
        .filter(|ip| *ip != local)
        .collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
