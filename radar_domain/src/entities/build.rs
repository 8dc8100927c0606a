// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Build Entity
//!
//! `reap_time` is only set when the build's event stream is deleted; builds
//! that never had events are left with `reap_time = None` (§6, "Build
//! events" - unspecified for implementations, tests treat this as open).

use crate::value_objects::{BuildId, JobId, PipelineId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildStatus {
    Pending,
    Started,
    Succeeded,
    Failed,
    Errored,
    Aborted,
}

impl BuildStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Errored | Self::Aborted)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Build {
    id: BuildId,
    job_id: Option<JobId>,
    pipeline_id: Option<PipelineId>,
    status: BuildStatus,
    engine: String,
    engine_metadata: Value,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    reap_time: Option<DateTime<Utc>>,
    has_events: bool,
}

impl Build {
    pub fn new_one_off(engine: impl Into<String>) -> Self {
        Self {
            id: BuildId::new(),
            job_id: None,
            pipeline_id: None,
            status: BuildStatus::Pending,
            engine: engine.into(),
            engine_metadata: Value::Null,
            start_time: None,
            end_time: None,
            reap_time: None,
            has_events: false,
        }
    }

    pub fn new_for_job(job_id: JobId, pipeline_id: PipelineId, engine: impl Into<String>) -> Self {
        Self {
            id: BuildId::new(),
            job_id: Some(job_id),
            pipeline_id: Some(pipeline_id),
            status: BuildStatus::Pending,
            engine: engine.into(),
            engine_metadata: Value::Null,
            start_time: None,
            end_time: None,
            reap_time: None,
            has_events: false,
        }
    }

    pub fn id(&self) -> &BuildId {
        &self.id
    }

    pub fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }

    pub fn pipeline_id(&self) -> Option<&PipelineId> {
        self.pipeline_id.as_ref()
    }

    pub fn status(&self) -> BuildStatus {
        self.status
    }

    pub fn engine(&self) -> &str {
        &self.engine
    }

    pub fn engine_metadata(&self) -> &Value {
        &self.engine_metadata
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn has_events(&self) -> bool {
        self.has_events
    }

    pub fn is_succeeded(&self) -> bool {
        self.status == BuildStatus::Succeeded
    }

    /// Reconstructs a `Build` from persisted columns. Used only by
    /// infrastructure adapters mapping rows back into the domain type.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: BuildId,
        job_id: Option<JobId>,
        pipeline_id: Option<PipelineId>,
        status: BuildStatus,
        engine: String,
        engine_metadata: Value,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
        reap_time: Option<DateTime<Utc>>,
        has_events: bool,
    ) -> Self {
        Self {
            id,
            job_id,
            pipeline_id,
            status,
            engine,
            engine_metadata,
            start_time,
            end_time,
            reap_time,
            has_events,
        }
    }

    pub fn start(&mut self) {
        self.status = BuildStatus::Started;
        self.start_time = Some(Utc::now());
    }

    pub fn finish(&mut self, status: BuildStatus) {
        debug_assert!(status.is_terminal());
        self.status = status;
        self.end_time = Some(Utc::now());
    }

    pub fn reap_time(&self) -> Option<DateTime<Utc>> {
        self.reap_time
    }

    pub fn record_event(&mut self) {
        self.has_events = true;
    }

    /// Deleting this build's event stream sets `reap_time` - but only if it
    /// ever had events (§6).
    pub fn reap_events(&mut self, now: DateTime<Utc>) {
        if self.has_events {
            self.reap_time = Some(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_off_build_has_no_job_or_pipeline() {
        let build = Build::new_one_off("exec");
        assert!(build.job_id().is_none());
        assert!(build.pipeline_id().is_none());
        assert_eq!(build.status(), BuildStatus::Pending);
    }

    #[test]
    fn finish_sets_terminal_status() {
        let mut build = Build::new_one_off("exec");
        build.start();
        build.finish(BuildStatus::Succeeded);
        assert!(build.is_succeeded());
    }

    #[test]
    fn reap_time_unset_without_prior_events() {
        let mut build = Build::new_one_off("exec");
        build.reap_events(Utc::now());
        assert!(build.reap_time().is_none());
    }

    #[test]
    fn reap_time_set_after_events_existed() {
        let mut build = Build::new_one_off("exec");
        build.record_event();
        let now = Utc::now();
        build.reap_events(now);
        assert_eq!(build.reap_time(), Some(now));
    }
}
