// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Repository Port
//!
//! Persistence contract for [`Pipeline`]s. Destroying a pipeline cascades
//! to everything it owns exclusively (§3 invariant 6); implementations are
//! responsible for the cascade, the domain only asserts the contract.

use crate::entities::Pipeline;
use crate::error::RadarError;
use crate::value_objects::PipelineId;
use async_trait::async_trait;

#[async_trait]
pub trait PipelineRepository: Send + Sync {
    async fn save(&self, pipeline: &Pipeline) -> Result<(), RadarError>;

    async fn find_by_id(&self, id: &PipelineId) -> Result<Option<Pipeline>, RadarError>;

    async fn find_by_team_and_name(&self, team_id: &str, name: &str) -> Result<Option<Pipeline>, RadarError>;

    async fn list_all(&self) -> Result<Vec<Pipeline>, RadarError>;

    async fn update(&self, pipeline: &Pipeline) -> Result<(), RadarError>;

    /// Cascades to the pipeline's jobs, resources, resource-configs owned
    /// only by it, builds, inputs, outputs and build events.
    async fn delete(&self, id: &PipelineId) -> Result<bool, RadarError>;
}
