// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Job Entity

use crate::value_objects::{BuildId, JobId, PipelineId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    id: JobId,
    pipeline_id: PipelineId,
    name: String,
    serial: bool,
    serial_groups: Vec<String>,
    first_logged_build_id: Option<BuildId>,
}

impl Job {
    pub fn new(pipeline_id: PipelineId, name: impl Into<String>) -> Self {
        Self {
            id: JobId::new(),
            pipeline_id,
            name: name.into(),
            serial: false,
            serial_groups: Vec::new(),
            first_logged_build_id: None,
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn pipeline_id(&self) -> &PipelineId {
        &self.pipeline_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_serial(&self) -> bool {
        self.serial || !self.serial_groups.is_empty()
    }

    pub fn serial_groups(&self) -> &[String] {
        &self.serial_groups
    }

    pub fn with_serial(mut self, serial: bool, serial_groups: Vec<String>) -> Self {
        self.serial = serial;
        self.serial_groups = serial_groups;
        self
    }

    pub fn first_logged_build_id(&self) -> Option<&BuildId> {
        self.first_logged_build_id.as_ref()
    }

    pub fn set_first_logged_build_id(&mut self, build_id: BuildId) {
        if self.first_logged_build_id.is_none() {
            self.first_logged_build_id = Some(build_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_groups_imply_serial() {
        let job = Job::new(PipelineId::new(), "deploy").with_serial(false, vec!["prod".into()]);
        assert!(job.is_serial());
    }

    #[test]
    fn first_logged_build_id_is_set_once() {
        let mut job = Job::new(PipelineId::new(), "deploy");
        let first = BuildId::new();
        let second = BuildId::new();
        job.set_first_logged_build_id(first.clone());
        job.set_first_logged_build_id(second);
        assert_eq!(job.first_logged_build_id(), Some(&first));
    }
}
