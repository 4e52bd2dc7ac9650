// Copyright (c) 2026 Lanwarden Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! A scripted [`LinkLayer`] standing in for the raw socket.
//!
//! Sent frames are recorded instead of transmitted; scans answer from a
//! fixed device table. Tests assert on the recorded frames with
//! [`ArpClaim::decode`].

use std::net::Ipv4Addr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use pnet::datalink::MacAddr;
use pnet::packet::Packet;
use pnet::packet::arp::{ArpOperation, ArpPacket};
use pnet::packet::ethernet::EthernetPacket;

use lanwarden_common::models::device::Device;
use lanwarden_core::link::LinkLayer;

pub const OUR_MAC: MacAddr = MacAddr(0x02, 0x00, 0x00, 0x00, 0x00, 0x01);
pub const GATEWAY_MAC: MacAddr = MacAddr(0x11, 0x22, 0x33, 0x44, 0x55, 0x66);
pub const GATEWAY_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 1);
pub const TARGET_MAC: MacAddr = MacAddr(0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF);
pub const TARGET_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 42);
pub const TARGET_MAC_STR: &str = "AA:BB:CC:DD:EE:FF";

pub struct MockLink {
    devices: Mutex<Vec<Device>>,
    frames: Mutex<Vec<Vec<u8>>>,
    fail_sends: AtomicBool,
}

impl MockLink {
    /// A LAN with the gateway and one target device present.
    pub fn with_target() -> Self {
        Self {
            devices: Mutex::new(vec![
                Device {
                    mac: GATEWAY_MAC,
                    ip: GATEWAY_IP,
                    name: None,
                },
                Device {
                    mac: TARGET_MAC,
                    ip: TARGET_IP,
                    name: Some("tablet".to_string()),
                },
            ]),
            frames: Mutex::new(Vec::new()),
            fail_sends: AtomicBool::new(false),
        }
    }

    /// A LAN where only the gateway answers.
    pub fn without_target() -> Self {
        let link = Self::with_target();
        link.devices
            .lock()
            .unwrap()
            .retain(|d| d.mac == GATEWAY_MAC);
        link
    }

    /// Moves the target device to a new address mid-test.
    pub fn renumber_target(&self, ip: Ipv4Addr) {
        let mut devices = self.devices.lock().unwrap();
        if let Some(device) = devices.iter_mut().find(|d| d.mac == TARGET_MAC) {
            device.ip = ip;
        }
    }

    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn sent_frames(&self) -> Vec<Vec<u8>> {
        self.frames.lock().unwrap().clone()
    }

    pub fn clear_frames(&self) {
        self.frames.lock().unwrap().clear();
    }

    /// Every recorded ARP frame, decoded, in send order.
    pub fn claims(&self) -> Vec<ArpClaim> {
        self.sent_frames()
            .iter()
            .filter_map(|f| ArpClaim::decode(f))
            .collect()
    }
}

#[async_trait]
impl LinkLayer for MockLink {
    fn local_mac(&self) -> MacAddr {
        OUR_MAC
    }

    fn default_gateway(&self) -> anyhow::Result<Ipv4Addr> {
        Ok(GATEWAY_IP)
    }

    async fn send_frame(&self, frame: &[u8]) -> anyhow::Result<()> {
        if self.fail_sends.load(Ordering::SeqCst) {
            anyhow::bail!("scripted send failure");
        }
        self.frames.lock().unwrap().push(frame.to_vec());
        Ok(())
    }

    async fn scan_subnet(&self) -> anyhow::Result<Vec<Device>> {
        Ok(self.devices.lock().unwrap().clone())
    }

    async fn lookup_mac(&self, mac: MacAddr) -> anyhow::Result<Option<Ipv4Addr>> {
        let devices = self.devices.lock().unwrap();
        Ok(devices.iter().find(|d| d.mac == mac).map(|d| d.ip))
    }

    async fn lookup_ip(&self, ip: Ipv4Addr) -> anyhow::Result<Option<MacAddr>> {
        let devices = self.devices.lock().unwrap();
        Ok(devices.iter().find(|d| d.ip == ip).map(|d| d.mac))
    }
}

/// The cache-relevant content of one recorded ARP frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpClaim {
    pub dst_mac: MacAddr,
    pub operation: ArpOperation,
    pub sender_mac: MacAddr,
    pub sender_ip: Ipv4Addr,
    pub target_mac: MacAddr,
    pub target_ip: Ipv4Addr,
}

impl ArpClaim {
    pub fn decode(frame: &[u8]) -> Option<Self> {
        let eth = EthernetPacket::new(frame)?;
        let arp = ArpPacket::new(eth.payload())?;
        Some(Self {
            dst_mac: eth.get_destination(),
            operation: arp.get_operation(),
            sender_mac: arp.get_sender_hw_addr(),
            sender_ip: arp.get_sender_proto_addr(),
            target_mac: arp.get_target_hw_addr(),
            target_ip: arp.get_target_proto_addr(),
        })
    }

    /// A forged reply: the claimed sender pair is IP-of-victim's-peer at
    /// our MAC.
    pub fn is_spoof(&self) -> bool {
        self.sender_mac == OUR_MAC
    }

    /// A corrective reply carrying a true MAC/IP pairing.
    pub fn is_restore(&self) -> bool {
        (self.sender_mac == GATEWAY_MAC && self.sender_ip == GATEWAY_IP)
            || (self.sender_mac == TARGET_MAC && self.sender_ip == TARGET_IP)
    }
}
