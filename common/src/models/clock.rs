// Copyright (c) 2026 Lanwarden Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! Minute-granularity wall-clock time.
//!
//! Preset windows are compared at minute resolution against the host's
//! local clock, so a dedicated minute-of-day type is both smaller and
//! stricter than carrying a full `chrono` time around. Parsing is
//! deliberately rigid: exactly `HH:MM`, two digits each, as that is the
//! wire format of both the config file and the HTTP API.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveTime, Timelike};
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use thiserror::Error;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid clock time {0:?}, expected HH:MM (00:00..23:59)")]
pub struct ParseClockTimeError(pub String);

/// A wall-clock time of day with minute granularity.
///
/// Ordering is plain minute-of-day ordering; midnight wrapping is the
/// schedule evaluator's concern, not this type's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);

    pub fn from_hm(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self(u16::from(hour) * 60 + u16::from(minute)))
        } else {
            None
        }
    }

    /// The current local wall-clock time, truncated to the minute.
    pub fn now() -> Self {
        Self::from(Local::now().time())
    }

    pub fn hour(self) -> u8 {
        (self.0 / 60) as u8
    }

    pub fn minute(self) -> u8 {
        (self.0 % 60) as u8
    }

    pub fn minute_of_day(self) -> u16 {
        self.0
    }

    /// Minutes from `self` forward to `other`, wrapping past midnight.
    pub fn minutes_until(self, other: ClockTime) -> u16 {
        (other.0 + MINUTES_PER_DAY - self.0) % MINUTES_PER_DAY
    }
}

impl From<NaiveTime> for ClockTime {
    fn from(t: NaiveTime) -> Self {
        Self((t.hour() * 60 + t.minute()) as u16)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = ParseClockTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return Err(ParseClockTimeError(s.to_string()));
        }

        let digits_ok = [bytes[0], bytes[1], bytes[3], bytes[4]]
            .iter()
            .all(u8::is_ascii_digit);
        if !digits_ok {
            return Err(ParseClockTimeError(s.to_string()));
        }

        let hour: u8 = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
        let minute: u8 = (bytes[3] - b'0') * 10 + (bytes[4] - b'0');

        Self::from_hm(hour, minute).ok_or_else(|| ParseClockTimeError(s.to_string()))
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
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
