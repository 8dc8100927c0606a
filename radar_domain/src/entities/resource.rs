// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Resource Entity

use crate::value_objects::{CheckInterval, PipelineId, ResourceConfigId, ResourceId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    id: ResourceId,
    pipeline_id: PipelineId,
    name: String,
    resource_type: String,
    source: Value,
    check_every: Option<String>,
    check_error: Option<String>,
    resource_config_id: Option<ResourceConfigId>,
}

impl Resource {
    pub fn new(pipeline_id: PipelineId, name: impl Into<String>, resource_type: impl Into<String>, source: Value) -> Self {
        Self {
            id: ResourceId::new(),
            pipeline_id,
            name: name.into(),
            resource_type: resource_type.into(),
            source,
            check_every: None,
            check_error: None,
            resource_config_id: None,
        }
    }

    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    pub fn pipeline_id(&self) -> &PipelineId {
        &self.pipeline_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn source(&self) -> &Value {
        &self.source
    }

    pub fn check_every(&self) -> Option<&str> {
        self.check_every.as_deref()
    }

    pub fn with_check_every(mut self, check_every: Option<String>) -> Self {
        self.check_every = check_every;
        self
    }

    pub fn check_error(&self) -> Option<&str> {
        self.check_error.as_deref()
    }

    pub fn resource_config_id(&self) -> Option<&ResourceConfigId> {
        self.resource_config_id.as_ref()
    }

    pub fn bind_resource_config(&mut self, resource_config_id: ResourceConfigId) {
        self.resource_config_id = Some(resource_config_id);
    }

    /// Records a failed check step (§4.1 rule 6). Any non-lock error is
    /// recorded here before propagating.
    pub fn set_check_error(&mut self, message: impl Into<String>) {
        self.check_error = Some(message.into());
    }

    /// A successful scan clears any previously recorded error.
    pub fn clear_check_error(&mut self) {
        self.check_error = None;
    }

    pub fn resolve_check_interval(&self, default: CheckInterval) -> Result<CheckInterval, crate::error::RadarError> {
        CheckInterval::resolve(self.check_every.as_deref(), default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Resource {
        Resource::new(PipelineId::new(), "app-repo", "git", json!({"uri": "https://example.com/app.git"}))
    }

    #[test]
    fn new_resource_has_no_config_binding() {
        let resource = sample();
        assert!(resource.resource_config_id().is_none());
        assert!(resource.check_error().is_none());
    }

    #[test]
    fn check_error_lifecycle() {
        let mut resource = sample();
        resource.set_check_error("time: invalid duration bad-value");
        assert_eq!(resource.check_error(), Some("time: invalid duration bad-value"));
        resource.clear_check_error();
        assert!(resource.check_error().is_none());
    }

    #[test]
    fn bind_resource_config_is_idempotent_overwrite() {
        let mut resource = sample();
        let first = ResourceConfigId::new();
        let second = ResourceConfigId::new();
        resource.bind_resource_config(first.clone());
        resource.bind_resource_config(second.clone());
        assert_eq!(resource.resource_config_id(), Some(&second));
    }

    #[test]
    fn resolve_check_interval_falls_back_to_default() {
        use std::time::Duration;
        let resource = sample();
        let default = CheckInterval::from_duration(Duration::from_secs(60));
        assert_eq!(resource.resolve_check_interval(default).unwrap(), default);
    }
}
