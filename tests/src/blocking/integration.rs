// Copyright (c) 2026 Lanwarden Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

#![cfg(test)]

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use lanwarden_common::config::AppConfig;
use lanwarden_common::models::clock::{ClockTime, MINUTES_PER_DAY};
use lanwarden_common::models::preset::{PresetWindow, default_presets};
use lanwarden_common::models::target::BlockTarget;
use lanwarden_core::control::{ControlError, Controller};
use lanwarden_core::directory::DeviceDirectory;
use lanwarden_core::engine::{BlockStatus, SpoofEngine};
use lanwarden_core::link::LinkLayer;
use lanwarden_core::schedule::{PresetEdge, PresetEvent};

use crate::mock::{
    ArpClaim, GATEWAY_IP, GATEWAY_MAC, MockLink, OUR_MAC, TARGET_IP, TARGET_MAC, TARGET_MAC_STR,
};

const RESTORE_REPEAT: usize = 5;

fn target() -> BlockTarget {
    BlockTarget::new(TARGET_MAC_STR, Some("tablet".to_string())).unwrap()
}

fn temp_config_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("lanwarden-it-{tag}-{}.json", std::process::id()))
}

/// All presets disabled so no scheduler trigger can fire mid-test.
fn quiet_config(with_target: bool) -> AppConfig {
    let presets: BTreeMap<String, PresetWindow> = default_presets()
        .into_iter()
        .map(|(name, w)| (name, PresetWindow::new(w.start, w.end, false)))
        .collect();
    AppConfig {
        presets,
        target_mac: with_target.then(|| TARGET_MAC_STR.to_string()),
        target_name: None,
    }
}

#[tokio::test(start_paused = true)]
async fn block_spoofs_both_sides_and_restores_on_stop() {
    let link = Arc::new(MockLink::with_target());
    let engine = SpoofEngine::new(Arc::clone(&link) as Arc<dyn LinkLayer>);

    engine.start(&target()).await.unwrap();
    assert_eq!(engine.status(), BlockStatus::Blocking);

    tokio::time::sleep(Duration::from_secs(3)).await;

    let claims: Vec<ArpClaim> = link.claims();
    assert!(
        claims.iter().any(|c| c.is_spoof()
            && c.dst_mac == TARGET_MAC
            && c.sender_ip == GATEWAY_IP
            && c.sender_mac == OUR_MAC),
        "no forged gateway claim was sent to the target"
    );
    assert!(
        claims.iter().any(|c| c.is_spoof()
            && c.dst_mac == GATEWAY_MAC
            && c.sender_ip == TARGET_IP
            && c.sender_mac == OUR_MAC),
        "no forged target claim was sent to the gateway"
    );

    link.clear_frames();
    engine.stop().await;
    assert_eq!(engine.status(), BlockStatus::Idle);

    let claims: Vec<ArpClaim> = link.claims();
    let to_target: Vec<&ArpClaim> = claims
        .iter()
        .filter(|c| c.is_restore() && c.dst_mac == TARGET_MAC)
        .collect();
    let to_gateway: Vec<&ArpClaim> = claims
        .iter()
        .filter(|c| c.is_restore() && c.dst_mac == GATEWAY_MAC)
        .collect();

    assert_eq!(to_target.len(), RESTORE_REPEAT);
    assert_eq!(to_gateway.len(), RESTORE_REPEAT);
    assert!(to_target.iter().all(|c| c.sender_mac == GATEWAY_MAC
        && c.sender_ip == GATEWAY_IP
        && c.target_ip == TARGET_IP));
    assert!(to_gateway.iter().all(|c| c.sender_mac == TARGET_MAC
        && c.sender_ip == TARGET_IP
        && c.target_ip == GATEWAY_IP));
    assert!(
        claims.iter().all(|c| !c.is_spoof()),
        "spoof frames after stop"
    );
}

#[tokio::test(start_paused = true)]
async fn second_start_does_not_add_a_second_loop() {
    let link = Arc::new(MockLink::with_target());
    let engine = SpoofEngine::new(Arc::clone(&link) as Arc<dyn LinkLayer>);

    engine.start(&target()).await.unwrap();
    engine.start(&target()).await.unwrap();

    tokio::time::sleep(Duration::from_secs(5)).await;

    // One loop ticks once a second: at most 6 pairs in 5s, plus slack.
    let to_target = link
        .claims()
        .iter()
        .filter(|c| c.is_spoof() && c.dst_mac == TARGET_MAC)
        .count();
    assert!(to_target >= 2, "spoof loop did not run");
    assert!(
        to_target <= 7,
        "two spoof loops appear to be running ({to_target} frames in 5s)"
    );

    engine.stop().await;
}

#[tokio::test(start_paused = true)]
async fn send_failures_back_off_and_recover() {
    let link = Arc::new(MockLink::with_target());
    let engine = SpoofEngine::new(Arc::clone(&link) as Arc<dyn LinkLayer>);

    engine.start(&target()).await.unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!link.claims().is_empty());

    link.set_fail_sends(true);
    link.clear_frames();
    tokio::time::sleep(Duration::from_secs(5)).await;

    // Failures are swallowed: nothing lands, but the session survives.
    assert!(link.sent_frames().is_empty());
    assert_eq!(engine.status(), BlockStatus::Blocking);

    link.set_fail_sends(false);
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(
        link.claims().iter().any(ArpClaim::is_spoof),
        "loop did not resume after the transport recovered"
    );

    engine.stop().await;
    assert!(link.claims().iter().any(ArpClaim::is_restore));
}

#[tokio::test(start_paused = true)]
async fn stop_without_session_is_a_no_op() {
    let link = Arc::new(MockLink::with_target());
    let engine = SpoofEngine::new(Arc::clone(&link) as Arc<dyn LinkLayer>);

    engine.stop().await;
    assert_eq!(engine.status(), BlockStatus::Idle);
    assert!(link.sent_frames().is_empty());
}

#[tokio::test(start_paused = true)]
async fn start_fails_when_target_is_off_network() {
    let link = Arc::new(MockLink::without_target());
    let engine = SpoofEngine::new(Arc::clone(&link) as Arc<dyn LinkLayer>);

    let err = engine.start(&target()).await.unwrap_err();
    assert!(err.to_string().contains("not on the network"), "{err}");
    assert_eq!(engine.status(), BlockStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn restore_uses_addresses_from_session_start() {
    let link = Arc::new(MockLink::with_target());
    let engine = SpoofEngine::new(Arc::clone(&link) as Arc<dyn LinkLayer>);

    engine.start(&target()).await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    // The device renumbering mid-session must not change the restore.
    link.renumber_target("192.168.1.99".parse().unwrap());
    link.clear_frames();
    engine.stop().await;

    let restores: Vec<ArpClaim> = link.claims();
    assert!(!restores.is_empty());
    assert!(
        restores
            .iter()
            .filter(|c| c.dst_mac == TARGET_MAC)
            .all(|c| c.target_ip == TARGET_IP),
        "restore frames must use the address resolved at session start"
    );
}

#[tokio::test(start_paused = true)]
async fn toggle_without_target_is_rejected() {
    let link = Arc::new(MockLink::without_target());
    let controller = Controller::new(
        link as Arc<dyn LinkLayer>,
        quiet_config(false),
        temp_config_path("no-target"),
    );

    let err = controller.toggle_block(true).await.unwrap_err();
    assert!(matches!(err, ControlError::NoTarget));

    // The precondition also applies when asking to unblock.
    let err = controller.toggle_block(false).await.unwrap_err();
    assert!(matches!(err, ControlError::NoTarget));
}

#[tokio::test(start_paused = true)]
async fn toggle_starts_then_stops_in_manual_mode() {
    let link = Arc::new(MockLink::with_target());
    let controller = Controller::new(
        Arc::clone(&link) as Arc<dyn LinkLayer>,
        quiet_config(true),
        temp_config_path("toggle"),
    );

    let report = controller.toggle_block(true).await.unwrap();
    assert!(report.is_blocking);
    assert_eq!(report.active_mode, "Manual");

    // Asking again for the current state is a no-op.
    let report = controller.toggle_block(true).await.unwrap();
    assert!(report.is_blocking);

    let report = controller.toggle_block(false).await.unwrap();
    assert!(!report.is_blocking);
    assert_eq!(report.active_mode, "Manual");
}

#[tokio::test(start_paused = true)]
async fn end_edge_of_a_different_mode_is_ignored() {
    let link = Arc::new(MockLink::with_target());
    let controller = Controller::new(
        Arc::clone(&link) as Arc<dyn LinkLayer>,
        quiet_config(true),
        temp_config_path("end-guard"),
    );

    // Manual block in place; a stray Bedtime end must not lift it.
    controller.toggle_block(true).await.unwrap();
    controller
        .apply_preset(&PresetEvent {
            preset: "Bedtime".to_string(),
            edge: PresetEdge::End,
        })
        .await;
    assert!(controller.status().await.is_blocking);

    // Once Bedtime owns the mode, its end edge unblocks.
    controller
        .apply_preset(&PresetEvent {
            preset: "Bedtime".to_string(),
            edge: PresetEdge::Start,
        })
        .await;
    assert_eq!(controller.status().await.active_mode, "Bedtime");

    controller
        .apply_preset(&PresetEvent {
            preset: "Bedtime".to_string(),
            edge: PresetEdge::End,
        })
        .await;
    let report = controller.status().await;
    assert!(!report.is_blocking);
    assert_eq!(report.active_mode, "Manual");
}

#[tokio::test(start_paused = true)]
async fn clearing_the_target_ends_the_session() {
    let link = Arc::new(MockLink::with_target());
    let controller = Controller::new(
        Arc::clone(&link) as Arc<dyn LinkLayer>,
        quiet_config(true),
        temp_config_path("clear"),
    );

    controller.toggle_block(true).await.unwrap();
    link.clear_frames();

    let report = controller.clear_target().await;
    assert!(!report.is_blocking);
    assert!(report.target_mac.is_none());
    assert!(
        link.claims().iter().any(|c| c.is_restore()),
        "caches were not healed when the target was cleared"
    );
}

#[tokio::test(start_paused = true)]
async fn unknown_mode_is_rejected() {
    let link = Arc::new(MockLink::with_target());
    let controller = Controller::new(
        link as Arc<dyn LinkLayer>,
        quiet_config(true),
        temp_config_path("bad-mode"),
    );

    let err = controller.set_mode("Siesta").await.unwrap_err();
    assert!(matches!(err, ControlError::UnknownMode(_)));
}

#[tokio::test(start_paused = true)]
async fn update_schedule_rejects_unknown_presets() {
    let link = Arc::new(MockLink::with_target());
    let controller = Controller::new(
        link as Arc<dyn LinkLayer>,
        quiet_config(true),
        temp_config_path("bad-preset"),
    );

    let window = PresetWindow::new(
        "01:00".parse().unwrap(),
        "02:00".parse().unwrap(),
        false,
    );
    let err = controller
        .update_schedule("Siesta", window)
        .await
        .unwrap_err();
    assert!(matches!(err, ControlError::UnknownPreset(_)));

    let presets = controller
        .update_schedule("Lunch", window)
        .await
        .unwrap();
    assert_eq!(presets["Lunch"], window);
}

#[tokio::test(start_paused = true)]
async fn set_mode_reconciles_against_the_clock() {
    let link = Arc::new(MockLink::with_target());
    let controller = Controller::new(
        Arc::clone(&link) as Arc<dyn LinkLayer>,
        quiet_config(true),
        temp_config_path("reconcile"),
    );

    // Windows anchored to the current wall clock, so the outcomes do
    // not depend on when this test runs.
    let now: u16 = ClockTime::now().minute_of_day();
    let clock = |m: u16| {
        let m = m % MINUTES_PER_DAY;
        ClockTime::from_hm((m / 60) as u8, (m % 60) as u8).unwrap()
    };
    let covering = PresetWindow::new(clock(now + MINUTES_PER_DAY - 60), clock(now + 60), true);
    let elsewhere = PresetWindow::new(clock(now + 120), clock(now + 180), true);
    controller
        .update_schedule("Breakfast", covering)
        .await
        .unwrap();
    controller
        .update_schedule("Dinner", elsewhere)
        .await
        .unwrap();

    // Inside the window: selecting the preset starts blocking now.
    let report = controller.set_mode("Breakfast").await.unwrap();
    assert!(report.is_blocking);
    assert_eq!(report.active_mode, "Breakfast");

    // Outside the window: selecting the preset stops the block.
    let report = controller.set_mode("Dinner").await.unwrap();
    assert!(!report.is_blocking);
    assert_eq!(report.active_mode, "Dinner");

    controller.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn set_mode_on_a_disabled_preset_still_reconciles() {
    let link = Arc::new(MockLink::with_target());
    let controller = Controller::new(
        Arc::clone(&link) as Arc<dyn LinkLayer>,
        quiet_config(true),
        temp_config_path("disabled-mode"),
    );

    // Disabled window covering the current time: no triggers register,
    // but an explicit mode choice still evaluates the window.
    let now: u16 = ClockTime::now().minute_of_day();
    let clock = |m: u16| {
        let m = m % MINUTES_PER_DAY;
        ClockTime::from_hm((m / 60) as u8, (m % 60) as u8).unwrap()
    };
    let covering = PresetWindow::new(clock(now + MINUTES_PER_DAY - 60), clock(now + 60), false);
    controller.update_schedule("Bedtime", covering).await.unwrap();

    let report = controller.set_mode("Bedtime").await.unwrap();
    assert!(report.is_blocking, "disabled preset inside its window must still block");
    assert_eq!(report.active_mode, "Bedtime");

    controller.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn directory_resolves_macs_in_any_letter_case() {
    let link = Arc::new(MockLink::with_target());
    let directory = DeviceDirectory::new(link as Arc<dyn LinkLayer>);

    let ip = directory.resolve_ip("aa:bb:cc:dd:ee:ff").await.unwrap();
    assert_eq!(ip, Some(TARGET_IP));

    // Malformed input is "not on the network", not a sweep failure.
    assert_eq!(directory.resolve_ip("not-a-mac").await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn target_changes_are_persisted() {
    let link = Arc::new(MockLink::with_target());
    let path = temp_config_path("persist");
    let _ = std::fs::remove_file(&path);
    let controller = Controller::new(
        link as Arc<dyn LinkLayer>,
        quiet_config(false),
        path.clone(),
    );

    controller
        .set_target("aa:bb:cc:dd:ee:ff", Some("tablet".to_string()))
        .await
        .unwrap();
    let saved = AppConfig::load(&path).unwrap();
    assert_eq!(saved.target_mac.as_deref(), Some("AA:BB:CC:DD:EE:FF"));
    assert_eq!(saved.target_name.as_deref(), Some("tablet"));

    controller.clear_target().await;
    let saved = AppConfig::load(&path).unwrap();
    assert!(saved.target_mac.is_none());
    assert!(saved.target_name.is_none());

    let _ = std::fs::remove_file(&path);
}

#[tokio::test(start_paused = true)]
async fn set_target_replaces_without_stopping() {
    let link = Arc::new(MockLink::with_target());
    let controller = Controller::new(
        Arc::clone(&link) as Arc<dyn LinkLayer>,
        quiet_config(true),
        temp_config_path("replace"),
    );

    controller.toggle_block(true).await.unwrap();
    let report = controller
        .set_target("02:02:02:02:02:02", Some("phone".to_string()))
        .await
        .unwrap();

    assert!(report.is_blocking);
    assert_eq!(report.target_mac.as_deref(), Some("02:02:02:02:02:02"));
    controller.shutdown().await;
}
