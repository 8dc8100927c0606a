// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Resource Driver Port (§6)
//!
//! Opaque external `check`/`in`/`out` scripts. This crate only specifies
//! the input/output shape, never the wire protocol - that's an explicit
//! Non-goal (§1).

use crate::error::RadarError;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

/// One version discovered by a `check` invocation.
#[derive(Debug, Clone)]
pub struct DiscoveredVersion {
    pub space: String,
    pub version: Value,
    pub metadata: Value,
}

/// Result of an `in` (get) invocation.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub metadata: Value,
    pub exit_status: i32,
    /// Path to the fetched volume's gzipped tar archive (§6 "Artifact
    /// stream format"), on the worker's own filesystem. `None` when
    /// `exit_status != 0` - nothing was published.
    pub volume_path: Option<std::path::PathBuf>,
}

/// Result of an `out` (put) invocation.
#[derive(Debug, Clone)]
pub struct PutOutcome {
    pub versions: Vec<DiscoveredVersion>,
    pub metadata: Value,
    pub exit_status: i32,
}

#[async_trait]
pub trait ResourceDriver: Send + Sync {
    /// Streams back new `(space, version, metadata)` triples, given the
    /// resource's current per-space latest versions as `from` (§4.1 rule 4).
    async fn check(
        &self,
        source: &Value,
        current_versions_by_space: &[(String, Value)],
    ) -> Result<BoxStream<'static, Result<DiscoveredVersion, RadarError>>, RadarError>;

    /// Fetches a chosen version into a worker volume. Exit status != 0
    /// surfaces through `FetchOutcome::exit_status`, not as an `Err` - the
    /// get-step turns that into a user-visible failure (§4.4, §7 DriverFailure).
    async fn fetch(&self, source: &Value, space: &str, version: &Value, params: &Value) -> Result<FetchOutcome, RadarError>;

    async fn put(&self, source: &Value, params: &Value) -> Result<PutOutcome, RadarError>;
}
