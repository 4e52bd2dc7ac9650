// Copyright (c) 2026 Lanwarden Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! LAN device discovery.

use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::Arc;

use pnet::util::MacAddr;

use lanwarden_common::models::device::Device;
use lanwarden_common::utils::mac;
use lanwarden_common::{debug, info};

use crate::link::LinkLayer;

/// Answers "who is on the LAN" and "where is this MAC right now".
///
/// Every call hits the wire; there is no cache at this layer, so a device
/// that dropped off the network stops appearing immediately.
pub struct DeviceDirectory {
    link: Arc<dyn LinkLayer>,
}

impl DeviceDirectory {
    pub fn new(link: Arc<dyn LinkLayer>) -> Self {
        Self { link }
    }

    /// All devices currently answering ARP on the local subnet.
    pub async fn list_devices(&self) -> anyhow::Result<Vec<Device>> {
        info!("Scanning local subnet for devices");
        let devices: Vec<Device> = self.link.scan_subnet().await?;
        info!("Discovered {} devices", devices.len());
        Ok(devices)
    }

    /// The current IPv4 address of `mac_str`, or `None` when the device
    /// is not on the network. Errors only when the sweep itself fails.
    pub async fn resolve_ip(&self, mac_str: &str) -> anyhow::Result<Option<Ipv4Addr>> {
        let Ok(canonical) = mac::normalize(mac_str) else {
            debug!(verbosity = 1, "Cannot resolve malformed MAC {mac_str}");
            return Ok(None);
        };
        let wanted: MacAddr = MacAddr::from_str(&canonical)
            .map_err(|_| anyhow::anyhow!("normalized MAC {canonical} failed to parse"))?;

        self.link.lookup_mac(wanted).await
    }
}
