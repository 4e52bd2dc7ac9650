// Copyright (c) 2026 Lanwarden Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! Persisted daemon state.
//!
//! A small JSON document holding the preset table and the current block
//! target. Runtime state (whether a spoof loop is live, the active mode)
//! is deliberately not persisted; a restart always comes up Idle.
//!
//! Loading is strict: a document that exists but does not match the
//! schema fails with a clear error instead of silently defaulting fields.
//! Saving is best-effort; callers log failures and keep their in-memory
//! state authoritative.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::preset::{PresetWindow, default_presets};
use crate::models::target::BlockTarget;

pub const DEFAULT_CONFIG_FILE: &str = "lanwarden.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub presets: BTreeMap<String, PresetWindow>,
    pub target_mac: Option<String>,
    pub target_name: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            presets: default_presets(),
            target_mac: None,
            target_name: None,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw: String = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Loads the document at `path`, seeding defaults when it does not
    /// exist yet. A present-but-invalid document is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let raw: String = serde_json::to_string_pretty(self)?;
        fs::write(path, raw)?;
        Ok(())
    }

    pub fn target(&self) -> Option<BlockTarget> {
        self.target_mac.as_ref().map(|mac| BlockTarget {
            mac: mac.clone(),
            name: self.target_name.clone(),
        })
    }

    pub fn set_target(&mut self, target: Option<BlockTarget>) {
        match target {
            Some(t) => {
                self.target_mac = Some(t.mac);
                self.target_name = t.name;
            }
            None => {
                self.target_mac = None;
                self.target_name = None;
            }
        }
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
