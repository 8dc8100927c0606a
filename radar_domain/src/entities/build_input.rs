// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # BuildInput Entity

use crate::value_objects::{BuildId, ResourceId, ResourceVersionId, Space};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildInput {
    build_id: BuildId,
    name: String,
    resource_id: ResourceId,
    space: Space,
    version_id: ResourceVersionId,
    first_occurrence: bool,
}

impl BuildInput {
    pub fn new(
        build_id: BuildId,
        name: impl Into<String>,
        resource_id: ResourceId,
        space: Space,
        version_id: ResourceVersionId,
        first_occurrence: bool,
    ) -> Self {
        Self {
            build_id,
            name: name.into(),
            resource_id,
            space,
            version_id,
            first_occurrence,
        }
    }

    pub fn build_id(&self) -> &BuildId {
        &self.build_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource_id(&self) -> &ResourceId {
        &self.resource_id
    }

    pub fn space(&self) -> &Space {
        &self.space
    }

    pub fn version_id(&self) -> &ResourceVersionId {
        &self.version_id
    }

    pub fn is_first_occurrence(&self) -> bool {
        self.first_occurrence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_referenced_version_unchanged() {
        let version_id = ResourceVersionId::new();
        let input = BuildInput::new(
            BuildId::new(),
            "app-repo",
            ResourceId::new(),
            Space::default_space(),
            version_id.clone(),
            true,
        );
        assert_eq!(input.version_id(), &version_id);
        assert!(input.is_first_occurrence());
    }
}
