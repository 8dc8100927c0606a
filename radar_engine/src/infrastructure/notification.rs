// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! In-process [`NotificationBus`] backed by `tokio::sync::broadcast`.
//!
//! A single-node stand-in for the Postgres `LISTEN`/`NOTIFY` channel pair
//! the tracker runner depends on (§6); every replica shares one process
//! here, so there's no cross-node fan-out to do.

use async_trait::async_trait;
use parking_lot::Mutex;
use radar_domain::{NotificationBus, NotificationStream};
use std::collections::HashMap;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

pub struct BroadcastNotificationBus {
    channels: Mutex<HashMap<String, broadcast::Sender<()>>>,
}

impl BroadcastNotificationBus {
    pub fn new() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
        }
    }

    fn sender_for(&self, channel: &str) -> broadcast::Sender<()> {
        let mut channels = self.channels.lock();
        channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

impl Default for BroadcastNotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

struct BroadcastStream(broadcast::Receiver<()>);

#[async_trait]
impl NotificationStream for BroadcastStream {
    async fn recv(&mut self) -> Option<()> {
        loop {
            match self.0.recv().await {
                Ok(()) => return Some(()),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[async_trait]
impl NotificationBus for BroadcastNotificationBus {
    async fn listen(&self, channel: &str) -> Box<dyn NotificationStream> {
        Box::new(BroadcastStream(self.sender_for(channel).subscribe()))
    }

    async fn unlisten(&self, _channel: &str, stream: Box<dyn NotificationStream>) {
        drop(stream);
    }

    async fn notify(&self, channel: &str) {
        let _ = self.sender_for(channel).send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn listener_receives_notification() {
        let bus = BroadcastNotificationBus::new();
        let mut stream = bus.listen("atc_shutdown").await;
        bus.notify("atc_shutdown").await;
        assert_eq!(stream.recv().await, Some(()));
    }

    #[tokio::test]
    async fn listeners_on_different_channels_are_isolated() {
        let bus = BroadcastNotificationBus::new();
        let mut build_started = bus.listen("build_started").await;
        bus.notify("atc_shutdown").await;

        let timeout = tokio::time::timeout(std::time::Duration::from_millis(20), build_started.recv()).await;
        assert!(timeout.is_err(), "unrelated channel must not wake this listener");
    }
}
