// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Distributed Lock Service Port (C3)
//!
//! The resource-config-checking lock (§5 "shared resources"): callers
//! specify `(key, interval, immediate)`. A non-immediate acquire fails if
//! any peer held or released the same key within `interval`. Every
//! successful acquisition must be released by the holder.

use crate::error::RadarError;
use async_trait::async_trait;
use std::time::Duration;

/// RAII-style lock handle. Dropping without calling `release` is a bug in
/// the caller, not a correctness issue for other peers - the lock's
/// interval gate still protects them, but the holder should always
/// release promptly to let the next scheduled check proceed sooner.
#[async_trait]
pub trait LockHandle: Send {
    async fn release(self: Box<Self>);
}

#[async_trait]
pub trait LockService: Send + Sync {
    /// Attempts to acquire `key`. Returns `Ok(None)` (not an error) if
    /// another replica acquired or released the same key within `interval`
    /// and `immediate` is false (§4.1 rule 3, §7 LockUnavailable).
    async fn try_acquire(
        &self,
        key: &str,
        interval: Duration,
        immediate: bool,
    ) -> Result<Option<Box<dyn LockHandle>>, RadarError>;
}
