// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Build Repository Port
//!
//! Persistence contract for builds, jobs, build inputs and outputs, plus
//! the append-only build-event log whose deletion sets `reap_time` (§6).

use crate::entities::{Build, BuildInput, BuildOutput, Job};
use crate::error::RadarError;
use crate::value_objects::{BuildId, JobId, PipelineId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait BuildRepository: Send + Sync {
    async fn save_job(&self, job: &Job) -> Result<(), RadarError>;

    async fn list_jobs(&self, pipeline_id: &PipelineId) -> Result<Vec<Job>, RadarError>;

    async fn find_job(&self, id: &JobId) -> Result<Option<Job>, RadarError>;

    async fn save_build(&self, build: &Build) -> Result<(), RadarError>;

    async fn update_build(&self, build: &Build) -> Result<(), RadarError>;

    async fn find_build(&self, id: &BuildId) -> Result<Option<Build>, RadarError>;

    /// Builds not yet in a terminal state, consulted by the tracker runner's
    /// `Track()` on every tick/notification edge (§4.3).
    async fn find_pending_builds(&self) -> Result<Vec<Build>, RadarError>;

    /// All builds of `pipeline_id`'s jobs, used by `VersionsDbService` to
    /// assemble projection candidates (§4.2).
    async fn list_builds_for_pipeline(&self, pipeline_id: &PipelineId) -> Result<Vec<Build>, RadarError>;

    async fn save_build_input(&self, input: &BuildInput) -> Result<(), RadarError>;

    async fn save_build_output(&self, output: &BuildOutput) -> Result<(), RadarError>;

    async fn list_build_inputs(&self, build_id: &BuildId) -> Result<Vec<BuildInput>, RadarError>;

    async fn list_build_outputs(&self, build_id: &BuildId) -> Result<Vec<BuildOutput>, RadarError>;

    /// No-op for an empty slice. Sets `reap_time = now` only for builds
    /// that had events prior to deletion (§6).
    async fn delete_build_events_by_build_ids(&self, build_ids: &[BuildId], now: DateTime<Utc>) -> Result<(), RadarError>;
}
