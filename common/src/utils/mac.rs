// Copyright (c) 2026 Lanwarden Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! **Medium Access Control (MAC)** address operations.
//!
//! Covers the normalized textual form used across the config file and the
//! HTTP API, plus **Organizationally Unique Identifier (OUI)** database
//! lookups so scanned devices can be labelled with a vendor (e.g. Cisco).

use std::str::FromStr;
use std::sync::OnceLock;

use mac_oui::Oui;
use pnet::util::MacAddr;
use thiserror::Error;

static OUI_DB: OnceLock<Oui> = OnceLock::new();

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid MAC address {0:?}, expected six ':' or '-' separated hex pairs")]
pub struct InvalidMacError(pub String);

/// Normalizes a MAC string to the canonical uppercase colon form.
///
/// Accepts `:` or `-` separators and any letter case; everything else is
/// rejected. `"aa-bb-cc-dd-ee-ff"` becomes `"AA:BB:CC:DD:EE:FF"`.
pub fn normalize(raw: &str) -> Result<String, InvalidMacError> {
    let candidate: String = raw.trim().replace('-', ":");
    let mac: MacAddr =
        MacAddr::from_str(&candidate).map_err(|_| InvalidMacError(raw.to_string()))?;
    Ok(format(mac))
}

/// The canonical uppercase colon rendering of a parsed address.
pub fn format(mac: MacAddr) -> String {
    mac.to_string().to_uppercase()
}

/// Retrieves or initializes the OUI database.
fn oui_db() -> &'static Oui {
    OUI_DB.get_or_init(|| Oui::default().expect("failed to load OUI database"))
}

/// Identify the vendor of a MAC address, if the prefix is registered.
pub fn vendor(mac: MacAddr) -> Option<String> {
    let db = oui_db();
    match db.lookup_by_mac(&mac.to_string()) {
        Ok(Some(entry)) => Some(entry.company_name.clone()),
        _ => None,
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
