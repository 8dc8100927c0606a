// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # BuildOutput Entity
//!
//! Only *explicit* outputs are persisted as rows. Implicit outputs (every
//! enabled input of a successful build) are never stored - they are
//! computed at projection time in `VersionsDb` from inputs × build status ×
//! enablement, to avoid double-counting across enable/disable toggles
//! (§9 design note).

use crate::value_objects::{BuildId, ResourceConfigId, ResourceVersionId, Space};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildOutput {
    build_id: BuildId,
    resource_config_id: ResourceConfigId,
    space: Space,
    version_id: ResourceVersionId,
    output_name: String,
    resource_name: String,
}

impl BuildOutput {
    pub fn new(
        build_id: BuildId,
        resource_config_id: ResourceConfigId,
        space: Space,
        version_id: ResourceVersionId,
        output_name: impl Into<String>,
        resource_name: impl Into<String>,
    ) -> Self {
        Self {
            build_id,
            resource_config_id,
            space,
            version_id,
            output_name: output_name.into(),
            resource_name: resource_name.into(),
        }
    }

    pub fn build_id(&self) -> &BuildId {
        &self.build_id
    }

    pub fn resource_config_id(&self) -> &ResourceConfigId {
        &self.resource_config_id
    }

    pub fn space(&self) -> &Space {
        &self.space
    }

    pub fn version_id(&self) -> &ResourceVersionId {
        &self.version_id
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_explicit_output_identity() {
        let output = BuildOutput::new(
            BuildId::new(),
            ResourceConfigId::new(),
            Space::default_space(),
            ResourceVersionId::new(),
            "image",
            "app-image",
        );
        assert_eq!(output.output_name(), "image");
        assert_eq!(output.resource_name(), "app-image");
    }
}
