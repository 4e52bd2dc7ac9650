// Copyright (c) 2026 Lanwarden Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! Raw Ethernet channel plumbing.
//!
//! `pnet`'s datalink receiver is a blocking iterator, so captures run on
//! a dedicated OS thread that forwards frames into a tokio mpsc queue.
//! The async side then consumes frames with `select!` alongside timers.
//! The reader thread exits on its own once the handle (and with it the
//! queue receiver) is dropped.

use anyhow::Context;
use pnet::datalink::{self, Channel, Config, DataLinkReceiver, DataLinkSender, NetworkInterface};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;

const READ_TIMEOUT_MS: u64 = 50;

pub struct EthernetHandle {
    pub tx: Box<dyn DataLinkSender>,
    pub rx: mpsc::UnboundedReceiver<Vec<u8>>,
}

pub fn start_capture(intf: &NetworkInterface) -> anyhow::Result<EthernetHandle> {
    let (tx, rx_socket) = open_eth_channel(intf)?;
    let (queue_tx, queue_rx) = mpsc::unbounded_channel();
    spawn_eth_listener(queue_tx, rx_socket);
    Ok(EthernetHandle {
        tx,
        rx: queue_rx,
    })
}

pub fn open_eth_channel(
    intf: &NetworkInterface,
) -> anyhow::Result<(Box<dyn DataLinkSender>, Box<dyn DataLinkReceiver>)> {
    let cfg = Config {
        read_timeout: Some(Duration::from_millis(READ_TIMEOUT_MS)),
        ..Default::default()
    };

    let ch: Channel = datalink::channel(intf, cfg)
        .with_context(|| format!("opening raw channel on {}", intf.name))?;

    match ch {
        Channel::Ethernet(tx, rx) => Ok((tx, rx)),
        _ => anyhow::bail!("non-ethernet channel for {}", intf.name),
    }
}

fn spawn_eth_listener(eth_tx: mpsc::UnboundedSender<Vec<u8>>, eth_rx: Box<dyn DataLinkReceiver>) {
    thread::spawn(move || {
        let mut eth_iter = eth_rx;
        loop {
            if let Ok(frame) = eth_iter.next()
                && eth_tx.send(frame.to_vec()).is_err()
            {
                break;
            }
        }
    });
}
