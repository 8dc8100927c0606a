// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Entity
//!
//! A `Pipeline` owns a set of Jobs, Resources and ResourceTypes. Destroying
//! a pipeline cascades to everything it owns exclusively; a `ResourceConfig`
//! shared with another pipeline is not affected.

use crate::error::RadarError;
use crate::value_objects::PipelineId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    id: PipelineId,
    name: String,
    team_id: String,
    paused: bool,
    config_version: u64,
}

impl Pipeline {
    pub fn new(name: impl Into<String>, team_id: impl Into<String>) -> Result<Self, RadarError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RadarError::ValidationError("pipeline name must not be empty".into()));
        }
        Ok(Self {
            id: PipelineId::new(),
            name,
            team_id: team_id.into(),
            paused: false,
            config_version: 1,
        })
    }

    pub fn from_parts(id: PipelineId, name: String, team_id: String, paused: bool, config_version: u64) -> Self {
        Self {
            id,
            name,
            team_id,
            paused,
            config_version,
        }
    }

    pub fn id(&self) -> &PipelineId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn team_id(&self) -> &str {
        &self.team_id
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn config_version(&self) -> u64 {
        self.config_version
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn unpause(&mut self) {
        self.paused = false;
    }

    /// A paused pipeline's resources skip checks (§4.1 pipeline-paused guard).
    pub fn should_skip_check(&self) -> bool {
        self.paused
    }

    pub fn rename(&mut self, new_name: impl Into<String>) -> Result<(), RadarError> {
        let new_name = new_name.into();
        if new_name.trim().is_empty() {
            return Err(RadarError::ValidationError("pipeline name must not be empty".into()));
        }
        self.name = new_name;
        self.config_version += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_pipeline_is_unpaused() {
        let pipeline = Pipeline::new("release", "team-a").unwrap();
        assert!(!pipeline.is_paused());
        assert_eq!(pipeline.config_version(), 1);
    }

    #[test]
    fn rejects_empty_name() {
        assert!(Pipeline::new("   ", "team-a").is_err());
    }

    #[test]
    fn paused_pipeline_skips_check() {
        let mut pipeline = Pipeline::new("release", "team-a").unwrap();
        pipeline.pause();
        assert!(pipeline.should_skip_check());
    }

    #[test]
    fn rename_bumps_config_version() {
        let mut pipeline = Pipeline::new("release", "team-a").unwrap();
        pipeline.rename("release-2").unwrap();
        assert_eq!(pipeline.name(), "release-2");
        assert_eq!(pipeline.config_version(), 2);
    }
}
