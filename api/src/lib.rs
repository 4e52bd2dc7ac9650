// Copyright (c) 2026 Lanwarden Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! The HTTP control surface.
//!
//! A small JSON API over the controller, one route per operation. CORS is
//! wide open since the daemon is meant to be driven by a browser UI on
//! the same LAN; there is no authentication layer, the raw-socket
//! privilege boundary is the host itself.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;

use lanwarden_common::models::clock::ClockTime;
use lanwarden_common::models::device::Device;
use lanwarden_common::models::preset::PresetWindow;
use lanwarden_common::{error, info};
use lanwarden_core::control::{ControlError, Controller, StatusReport};
use lanwarden_core::engine::StartError;

pub const SERVICE_NAME: &str = "lanwarden";

#[derive(Debug, Deserialize)]
struct ToggleBlockPayload {
    block: bool,
}

#[derive(Debug, Deserialize)]
struct SetModePayload {
    mode: String,
}

/// Times travel as raw strings so a malformed `"7:00"` produces a 400
/// naming the offending value instead of a generic decode error.
#[derive(Debug, Deserialize)]
struct UpdateSchedulePayload {
    preset: String,
    start: String,
    end: String,
    enabled: bool,
}

#[derive(Debug, Deserialize)]
struct SetTargetPayload {
    mac: String,
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct PresetsReply {
    presets: BTreeMap<String, PresetWindow>,
}

struct ApiError(ControlError);

impl From<ControlError> for ApiError {
    fn from(err: ControlError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status: StatusCode = match &self.0 {
            ControlError::NoTarget
            | ControlError::UnknownMode(_)
            | ControlError::UnknownPreset(_)
            | ControlError::InvalidTime(_)
            | ControlError::InvalidMac(_) => StatusCode::BAD_REQUEST,
            ControlError::Start(StartError::InvalidMac(_)) => StatusCode::BAD_REQUEST,
            ControlError::Start(StartError::TargetNotFound { .. }) => StatusCode::NOT_FOUND,
            ControlError::Start(_) | ControlError::Scan(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("Request failed: {:#}", anyhow::Error::new(self.0));
            return (status, Json(json!({ "error": "internal error" }))).into_response();
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub fn build_router(controller: Arc<Controller>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/status", get(status))
        .route("/toggle_block", post(toggle_block))
        .route("/set_mode", post(set_mode))
        .route("/update_schedule", post(update_schedule))
        .route("/devices", get(devices))
        .route("/presets", get(presets))
        .route("/target", post(set_target).delete(clear_target))
        .layer(CorsLayer::permissive())
        .with_state(controller)
}

/// Binds and serves until `shutdown` resolves, then tears the controller
/// down so ARP caches are healed before exit.
pub async fn serve(
    addr: SocketAddr,
    controller: Arc<Controller>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app: Router = build_router(Arc::clone(&controller));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("serving the control API")?;

    controller.shutdown().await;
    Ok(())
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn status(State(controller): State<Arc<Controller>>) -> Json<StatusReport> {
    Json(controller.status().await)
}

async fn toggle_block(
    State(controller): State<Arc<Controller>>,
    Json(payload): Json<ToggleBlockPayload>,
) -> Result<Json<StatusReport>, ApiError> {
    Ok(Json(controller.toggle_block(payload.block).await?))
}

async fn set_mode(
    State(controller): State<Arc<Controller>>,
    Json(payload): Json<SetModePayload>,
) -> Result<Json<StatusReport>, ApiError> {
    Ok(Json(controller.set_mode(&payload.mode).await?))
}

async fn update_schedule(
    State(controller): State<Arc<Controller>>,
    Json(payload): Json<UpdateSchedulePayload>,
) -> Result<Json<PresetsReply>, ApiError> {
    let start: ClockTime = parse_time(&payload.start)?;
    let end: ClockTime = parse_time(&payload.end)?;
    let window = PresetWindow::new(start, end, payload.enabled);

    let presets = controller.update_schedule(&payload.preset, window).await?;
    Ok(Json(PresetsReply { presets }))
}

async fn devices(
    State(controller): State<Arc<Controller>>,
) -> Result<Json<Vec<Device>>, ApiError> {
    Ok(Json(controller.devices().await?))
}

async fn presets(State(controller): State<Arc<Controller>>) -> Json<PresetsReply> {
    Json(PresetsReply {
        presets: controller.presets().await,
    })
}

async fn set_target(
    State(controller): State<Arc<Controller>>,
    Json(payload): Json<SetTargetPayload>,
) -> Result<Json<StatusReport>, ApiError> {
    Ok(Json(controller.set_target(&payload.mac, payload.name).await?))
}

async fn clear_target(State(controller): State<Arc<Controller>>) -> Json<StatusReport> {
    Json(controller.clear_target().await)
}

fn parse_time(raw: &str) -> Result<ClockTime, ApiError> {
    raw.parse::<ClockTime>()
        .map_err(|err| ApiError(ControlError::InvalidTime(err)))
}
