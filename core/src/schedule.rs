// Copyright (c) 2026 Lanwarden Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! Preset window evaluation and daily edge triggers.
//!
//! Two jobs live here. [`should_block`] answers "does this window cover
//! this instant" and is what mode changes reconcile against.
//! [`PresetScheduler`] owns one sleeper task per window edge; each fires
//! once a day at its wall-clock time and emits a [`PresetEvent`] for the
//! controller to act on. Reconfiguring drops every trigger and registers
//! the current table from scratch, so stale edges cannot survive a
//! schedule update.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{Local, Timelike};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use lanwarden_common::info;
use lanwarden_common::models::clock::{ClockTime, MINUTES_PER_DAY};
use lanwarden_common::models::preset::PresetWindow;

/// Whether `window` covers the instant `now`, purely on its times.
///
/// A window with `start == end` never matches; one with `start > end`
/// wraps past midnight. Start instants are inclusive, end instants
/// exclusive. The `enabled` flag is the caller's concern.
pub fn should_block(now: ClockTime, window: &PresetWindow) -> bool {
    if window.start == window.end {
        return false;
    }
    if window.crosses_midnight() {
        now >= window.start || now < window.end
    } else {
        now >= window.start && now < window.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetEdge {
    Start,
    End,
}

impl fmt::Display for PresetEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetEdge::Start => write!(f, "start"),
            PresetEdge::End => write!(f, "end"),
        }
    }
}

/// A window edge firing: "Bedtime start", "Lunch end".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetEvent {
    pub preset: String,
    pub edge: PresetEdge,
}

#[derive(Debug, Clone)]
struct Trigger {
    id: String,
    preset: String,
    edge: PresetEdge,
    at: ClockTime,
}

struct SchedulerInner {
    triggers: Vec<Trigger>,
    /// Cancels every sleeper task of the current trigger generation.
    generation: CancellationToken,
}

/// Registers daily wall-clock triggers and emits their events.
pub struct PresetScheduler {
    events: mpsc::UnboundedSender<PresetEvent>,
    inner: Mutex<SchedulerInner>,
}

impl PresetScheduler {
    pub fn new(events: mpsc::UnboundedSender<PresetEvent>) -> Self {
        Self {
            events,
            inner: Mutex::new(SchedulerInner {
                triggers: Vec::new(),
                generation: CancellationToken::new(),
            }),
        }
    }

    /// Replaces all registered triggers with the given preset table.
    ///
    /// Disabled presets register nothing. Zero-width windows still get
    /// their edges: both fire at the same instant and the end edge's
    /// mode guard sorts out the ordering.
    pub fn reconfigure(&self, presets: &BTreeMap<String, PresetWindow>) {
        let mut inner = self.inner.lock().expect("scheduler lock poisoned");

        inner.generation.cancel();
        inner.generation = CancellationToken::new();
        inner.triggers.clear();

        for (name, window) in presets {
            if !window.enabled {
                continue;
            }
            info!("Scheduled {name}: {} - {}", window.start, window.end);

            for (edge, at) in [(PresetEdge::Start, window.start), (PresetEdge::End, window.end)] {
                let trigger = Trigger {
                    id: format!("{name}_{edge}"),
                    preset: name.clone(),
                    edge,
                    at,
                };
                spawn_trigger(trigger.clone(), self.events.clone(), inner.generation.clone());
                inner.triggers.push(trigger);
            }
        }
    }

    /// Human-readable description of the soonest trigger, e.g.
    /// `"Bedtime_start at 21:00"`. `None` with no triggers registered.
    pub fn next_scheduled_action(&self) -> Option<String> {
        let inner = self.inner.lock().expect("scheduler lock poisoned");
        let now: ClockTime = ClockTime::now();

        inner
            .triggers
            .iter()
            .min_by_key(|t| minutes_to_fire(now, t.at))
            .map(|t| format!("{} at {}", t.id, t.at))
    }
}

impl Drop for PresetScheduler {
    fn drop(&mut self) {
        if let Ok(inner) = self.inner.lock() {
            inner.generation.cancel();
        }
    }
}

fn spawn_trigger(
    trigger: Trigger,
    events: mpsc::UnboundedSender<PresetEvent>,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        loop {
            let now = Local::now().time();
            let wait: Duration = sleep_until(ClockTime::from(now), now.second(), trigger.at);

            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(wait) => {
                    let event = PresetEvent {
                        preset: trigger.preset.clone(),
                        edge: trigger.edge,
                    };
                    if events.send(event).is_err() {
                        break;
                    }
                }
            }
        }
    });
}

/// Minutes until a trigger at `at` fires, counting "right now" as a full
/// day since the daily job already ran this minute.
fn minutes_to_fire(now: ClockTime, at: ClockTime) -> u16 {
    match now.minutes_until(at) {
        0 => MINUTES_PER_DAY,
        m => m,
    }
}

/// Time to sleep from `now` (with seconds) to the next firing of `at`.
fn sleep_until(now: ClockTime, now_second: u32, at: ClockTime) -> Duration {
    let minutes: u64 = u64::from(minutes_to_fire(now, at));
    Duration::from_secs(minutes * 60 - u64::from(now_second))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
