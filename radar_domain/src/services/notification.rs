// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Notification Bus Port (C1)
//!
//! Two channel names drive the build tracker runner: `atc_shutdown` and
//! `build_started`. Payload is not consumed - presence of an event on the
//! stream is the signal (§6).

use async_trait::async_trait;

pub const CHANNEL_ATC_SHUTDOWN: &str = "atc_shutdown";
pub const CHANNEL_BUILD_STARTED: &str = "build_started";

/// A live subscription to a notification channel. Each received `()`
/// represents one coarse "something changed" event.
#[async_trait]
pub trait NotificationStream: Send {
    /// Awaits the next event, or returns `None` once the bus has closed the
    /// channel (e.g. during shutdown).
    async fn recv(&mut self) -> Option<()>;
}

#[async_trait]
pub trait NotificationBus: Send + Sync {
    async fn listen(&self, channel: &str) -> Box<dyn NotificationStream>;

    async fn unlisten(&self, channel: &str, stream: Box<dyn NotificationStream>);

    async fn notify(&self, channel: &str);
}
