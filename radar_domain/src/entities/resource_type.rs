// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # ResourceType Entity
//!
//! Same shape as [`crate::entities::Resource`] plus a discovered `version`.
//! A pipeline's custom resource types resolve leaves-first: a type
//! depending on another custom type is scanned only after its dependency
//! has a concrete version.

use crate::value_objects::{PipelineId, ResourceConfigId, ResourceTypeId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceType {
    id: ResourceTypeId,
    pipeline_id: PipelineId,
    name: String,
    resource_type: String,
    source: Value,
    check_every: Option<String>,
    check_error: Option<String>,
    resource_config_id: Option<ResourceConfigId>,
    version: Option<Value>,
}

impl ResourceType {
    pub fn new(pipeline_id: PipelineId, name: impl Into<String>, resource_type: impl Into<String>, source: Value) -> Self {
        Self {
            id: ResourceTypeId::new(),
            pipeline_id,
            name: name.into(),
            resource_type: resource_type.into(),
            source,
            check_every: None,
            check_error: None,
            resource_config_id: None,
            version: None,
        }
    }

    pub fn id(&self) -> &ResourceTypeId {
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

    pub fn version(&self) -> Option<&Value> {
        self.version.as_ref()
    }

    pub fn set_version(&mut self, version: Value) {
        self.version = Some(version);
    }

    pub fn has_version(&self) -> bool {
        self.version.is_some()
    }

    pub fn check_error(&self) -> Option<&str> {
        self.check_error.as_deref()
    }

    pub fn set_check_error(&mut self, message: impl Into<String>) {
        self.check_error = Some(message.into());
    }

    pub fn clear_check_error(&mut self) {
        self.check_error = None;
    }

    pub fn resource_config_id(&self) -> Option<&ResourceConfigId> {
        self.resource_config_id.as_ref()
    }

    pub fn bind_resource_config(&mut self, resource_config_id: ResourceConfigId) {
        self.resource_config_id = Some(resource_config_id);
    }

    /// True when `other` shadows this type under the overriding-by-name rule
    /// (a pipeline-defined type with the same name as a base type).
    pub fn shadows(&self, base_type_name: &str) -> bool {
        self.resource_type == base_type_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ResourceType {
        ResourceType::new(PipelineId::new(), "my-type", "registry-image", json!({}))
    }

    #[test]
    fn new_type_has_no_version() {
        assert!(!sample().has_version());
    }

    #[test]
    fn set_version_marks_discovered() {
        let mut resource_type = sample();
        resource_type.set_version(json!({"digest": "sha256:abc"}));
        assert!(resource_type.has_version());
        assert_eq!(resource_type.version(), Some(&json!({"digest": "sha256:abc"})));
    }

    #[test]
    fn shadows_checks_type_name_not_resource_name() {
        let resource_type = sample();
        assert!(resource_type.shadows("registry-image"));
        assert!(!resource_type.shadows("my-type"));
    }
}
