// Copyright (c) 2026 Lanwarden Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! Raw frame construction and parsing for the link layer.
//!
//! Everything the daemon puts on the wire is ARP over Ethernet: discovery
//! requests for the subnet sweep, forged replies for the spoof loop, and
//! corrective replies for the restore protocol. The builders return full
//! frames padded to the minimum Ethernet length.

pub mod arp;
pub mod ethernet;
pub mod utils;
