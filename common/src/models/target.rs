// Copyright (c) 2026 Lanwarden Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};

use crate::utils::mac::{self, InvalidMacError};

/// Identity of the device being controlled.
///
/// The MAC is stored in normalized form (uppercase, colon separated) and
/// is the only required field; the label is purely cosmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTarget {
    pub mac: String,
    pub name: Option<String>,
}

impl BlockTarget {
    /// Builds a target from raw user input, normalizing the MAC.
    pub fn new(mac: &str, name: Option<String>) -> Result<Self, InvalidMacError> {
        Ok(Self {
            mac: mac::normalize(mac)?,
            name,
        })
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
