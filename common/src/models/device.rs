// Copyright (c) 2026 Lanwarden Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use std::net::Ipv4Addr;

use pnet::util::MacAddr;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::utils::mac;

/// One subnet-scan result: a device currently answering ARP on the LAN.
///
/// `name` holds the OUI vendor when the hardware prefix is known; there is
/// no hostname resolution at this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub mac: MacAddr,
    pub ip: Ipv4Addr,
    pub name: Option<String>,
}

impl Device {
    pub fn new(mac: MacAddr, ip: Ipv4Addr) -> Self {
        Self {
            mac,
            ip,
            name: mac::vendor(mac),
        }
    }

    /// The MAC in the normalized uppercase form used throughout the API.
    pub fn mac_string(&self) -> String {
        mac::format(self.mac)
    }
}

impl Serialize for Device {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Device", 3)?;
        state.serialize_field("mac", &self.mac_string())?;
        state.serialize_field("ip", &self.ip.to_string())?;
        state.serialize_field("name", &self.name)?;
        state.end()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
