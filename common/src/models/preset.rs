// Copyright (c) 2026 Lanwarden Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! Named daily blocking windows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::clock::ClockTime;

/// Sentinel mode name for operator-initiated blocking. Never appears as a
/// preset key.
pub const MANUAL_MODE: &str = "Manual";

/// A named daily schedule rule.
///
/// `start > end` means the window crosses midnight (active from `start`
/// through 23:59 and from 00:00 up to `end`). `start == end` denotes a
/// zero-width window that is never active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetWindow {
    pub start: ClockTime,
    pub end: ClockTime,
    pub enabled: bool,
}

impl PresetWindow {
    pub fn new(start: ClockTime, end: ClockTime, enabled: bool) -> Self {
        Self {
            start,
            end,
            enabled,
        }
    }

    pub fn crosses_midnight(&self) -> bool {
        self.start > self.end
    }
}

/// The preset table a fresh install starts with. Bedtime intentionally
/// crosses midnight.
pub fn default_presets() -> BTreeMap<String, PresetWindow> {
    let window = |start: &str, end: &str| -> PresetWindow {
        PresetWindow::new(start.parse().unwrap(), end.parse().unwrap(), true)
    };

    BTreeMap::from([
        ("Breakfast".to_string(), window("07:00", "08:00")),
        ("Lunch".to_string(), window("12:00", "13:00")),
        ("Dinner".to_string(), window("19:00", "20:00")),
        ("Bedtime".to_string(), window("21:00", "06:00")),
    ])
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
