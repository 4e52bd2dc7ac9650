// Copyright (c) 2026 Lanwarden Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! Central coordination of blocking state.
//!
//! The [`Controller`] is the only writer of the active mode, the target
//! and the preset table; the HTTP layer and the scheduler both funnel
//! through it. Scheduler edges arrive over a channel and are applied by a
//! background pump, so a trigger firing can never race an operator
//! request for the same lock.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Weak};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};

use lanwarden_common::config::AppConfig;
use lanwarden_common::models::clock::{ClockTime, ParseClockTimeError};
use lanwarden_common::models::device::Device;
use lanwarden_common::models::preset::{MANUAL_MODE, PresetWindow};
use lanwarden_common::models::target::BlockTarget;
use lanwarden_common::utils::mac::InvalidMacError;
use lanwarden_common::{info, warn};

use crate::directory::DeviceDirectory;
use crate::engine::{BlockStatus, SpoofEngine, StartError};
use crate::link::LinkLayer;
use crate::schedule::{self, PresetEdge, PresetEvent, PresetScheduler};

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("no target device configured")]
    NoTarget,
    #[error("unknown mode {0:?}")]
    UnknownMode(String),
    #[error("unknown preset {0:?}")]
    UnknownPreset(String),
    #[error(transparent)]
    InvalidTime(#[from] ParseClockTimeError),
    #[error(transparent)]
    InvalidMac(#[from] InvalidMacError),
    #[error(transparent)]
    Start(#[from] StartError),
    #[error("device scan failed")]
    Scan(#[source] anyhow::Error),
}

/// Snapshot returned by every state-changing operation. The field names
/// are the wire contract of `GET /status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub is_blocking: bool,
    pub active_mode: String,
    pub target_mac: Option<String>,
    pub target_name: Option<String>,
    pub presets: BTreeMap<String, PresetWindow>,
    pub next_scheduled_action: Option<String>,
}

struct ControlInner {
    active_mode: String,
    target: Option<BlockTarget>,
    presets: BTreeMap<String, PresetWindow>,
}

pub struct Controller {
    engine: SpoofEngine,
    scheduler: PresetScheduler,
    directory: DeviceDirectory,
    config_path: PathBuf,
    inner: Mutex<ControlInner>,
}

impl Controller {
    /// Builds the controller, registers the persisted preset table with
    /// the scheduler and starts the event pump. Must run inside a tokio
    /// runtime.
    pub fn new(link: Arc<dyn LinkLayer>, config: AppConfig, config_path: PathBuf) -> Arc<Self> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let presets = config.presets.clone();
        let controller = Arc::new(Self {
            engine: SpoofEngine::new(Arc::clone(&link)),
            directory: DeviceDirectory::new(link),
            scheduler: PresetScheduler::new(events_tx),
            config_path,
            inner: Mutex::new(ControlInner {
                active_mode: MANUAL_MODE.to_string(),
                target: config.target(),
                presets: presets.clone(),
            }),
        });

        controller.scheduler.reconfigure(&presets);
        tokio::spawn(pump_events(Arc::downgrade(&controller), events_rx));
        controller
    }

    pub async fn status(&self) -> StatusReport {
        let inner = self.inner.lock().await;
        self.report(&inner)
    }

    /// Operator-initiated block/unblock. Always lands in Manual mode.
    pub async fn toggle_block(&self, block: bool) -> Result<StatusReport, ControlError> {
        let mut inner = self.inner.lock().await;
        let target: BlockTarget = inner.target.clone().ok_or(ControlError::NoTarget)?;

        inner.active_mode = MANUAL_MODE.to_string();
        if block {
            self.engine.start(&target).await?;
        } else {
            self.engine.stop().await;
        }
        Ok(self.report(&inner))
    }

    /// Switches the active mode.
    ///
    /// `Manual` only relabels; a preset name also reconciles the engine
    /// against the current wall clock, so selecting `Bedtime` at 23:00
    /// starts blocking immediately. The `enabled` flag only governs
    /// trigger registration, an explicit mode choice overrides it.
    pub async fn set_mode(&self, mode: &str) -> Result<StatusReport, ControlError> {
        let mut inner = self.inner.lock().await;

        if mode != MANUAL_MODE {
            let Some(window) = inner.presets.get(mode).copied() else {
                return Err(ControlError::UnknownMode(mode.to_string()));
            };

            let should: bool = schedule::should_block(ClockTime::now(), &window);
            match (should, inner.target.clone()) {
                (true, Some(target)) => self.engine.start(&target).await?,
                (true, None) => {
                    warn!("{mode} is in its blocking window but no target is configured");
                }
                (false, _) => self.engine.stop().await,
            }
        }
        inner.active_mode = mode.to_string();
        info!("Mode set to {mode}");
        Ok(self.report(&inner))
    }

    /// Rewrites one preset's window and re-registers every trigger.
    pub async fn update_schedule(
        &self,
        name: &str,
        window: PresetWindow,
    ) -> Result<BTreeMap<String, PresetWindow>, ControlError> {
        let mut inner = self.inner.lock().await;
        if !inner.presets.contains_key(name) {
            return Err(ControlError::UnknownPreset(name.to_string()));
        }

        inner.presets.insert(name.to_string(), window);
        info!("Updated {name}: {} - {} (enabled: {})", window.start, window.end, window.enabled);

        self.scheduler.reconfigure(&inner.presets);
        self.persist(&inner);
        Ok(inner.presets.clone())
    }

    /// Sets (or replaces) the controlled device. A live session against
    /// the previous target keeps running until its next edge or toggle.
    pub async fn set_target(
        &self,
        mac: &str,
        name: Option<String>,
    ) -> Result<StatusReport, ControlError> {
        let target: BlockTarget = BlockTarget::new(mac, name)?;
        let mut inner = self.inner.lock().await;

        info!("Target set to {}", target.mac);
        inner.target = Some(target);
        self.persist(&inner);
        Ok(self.report(&inner))
    }

    /// Forgets the controlled device, ending any live session first.
    pub async fn clear_target(&self) -> StatusReport {
        let mut inner = self.inner.lock().await;
        self.engine.stop().await;
        inner.target = None;
        inner.active_mode = MANUAL_MODE.to_string();
        info!("Target cleared");
        self.persist(&inner);
        self.report(&inner)
    }

    pub async fn devices(&self) -> Result<Vec<Device>, ControlError> {
        self.directory.list_devices().await.map_err(ControlError::Scan)
    }

    pub async fn presets(&self) -> BTreeMap<String, PresetWindow> {
        self.inner.lock().await.presets.clone()
    }

    /// Applies a fired window edge.
    ///
    /// An end edge only unblocks while its own preset is still the
    /// active mode; an operator who switched modes mid-window keeps
    /// their decision.
    pub async fn apply_preset(&self, event: &PresetEvent) {
        let mut inner = self.inner.lock().await;
        info!("Trigger fired: {} {}", event.preset, event.edge);

        match event.edge {
            PresetEdge::Start => {
                inner.active_mode = event.preset.clone();
                match inner.target.clone() {
                    Some(target) => {
                        if let Err(err) = self.engine.start(&target).await {
                            warn!("Could not start blocking for {}: {err}", event.preset);
                        }
                    }
                    None => warn!("{} started but no target is configured", event.preset),
                }
            }
            PresetEdge::End => {
                if inner.active_mode == event.preset {
                    self.engine.stop().await;
                    inner.active_mode = MANUAL_MODE.to_string();
                } else {
                    info!(
                        "Ignoring {} end, active mode is {}",
                        event.preset, inner.active_mode
                    );
                }
            }
        }
    }

    /// Graceful teardown: ends any live session so caches are restored.
    pub async fn shutdown(&self) {
        info!("Shutting down");
        self.engine.stop().await;
    }

    fn report(&self, inner: &ControlInner) -> StatusReport {
        StatusReport {
            is_blocking: self.engine.status() == BlockStatus::Blocking,
            active_mode: inner.active_mode.clone(),
            target_mac: inner.target.as_ref().map(|t| t.mac.clone()),
            target_name: inner.target.as_ref().and_then(|t| t.name.clone()),
            presets: inner.presets.clone(),
            next_scheduled_action: self.scheduler.next_scheduled_action(),
        }
    }

    /// Best-effort save; in-memory state stays authoritative on failure.
    fn persist(&self, inner: &ControlInner) {
        let mut config = AppConfig {
            presets: inner.presets.clone(),
            target_mac: None,
            target_name: None,
        };
        config.set_target(inner.target.clone());
        if let Err(err) = config.save(&self.config_path) {
            warn!("Could not persist state to {}: {err}", self.config_path.display());
        }
    }
}

async fn pump_events(
    controller: Weak<Controller>,
    mut events: mpsc::UnboundedReceiver<PresetEvent>,
) {
    while let Some(event) = events.recv().await {
        let Some(controller) = controller.upgrade() else {
            break;
        };
        controller.apply_preset(&event).await;
    }
}
