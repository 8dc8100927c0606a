// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # ResourceVersion Entity
//!
//! `check_order` is the crux of the whole VersionsDB projection: zero means
//! "a build referenced this version before any check observed it"; nonzero
//! means "observed, ordered". Only the check-persistence path may advance
//! it — build I/O saves a reference, never a check order.

use crate::value_objects::{CheckOrder, ResourceConfigId, ResourceVersionId, Space};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceVersion {
    id: ResourceVersionId,
    resource_config_id: ResourceConfigId,
    space: Space,
    version: Value,
    metadata: Value,
    check_order: CheckOrder,
}

impl ResourceVersion {
    /// Creates an unchecked placeholder row (`check_order = 0`), as saved by
    /// `SaveUncheckedVersion` when a build references a version no check
    /// has seen yet (§3 lifecycle).
    pub fn new_unchecked(resource_config_id: ResourceConfigId, space: Space, version: Value) -> Self {
        Self {
            id: ResourceVersionId::new(),
            resource_config_id,
            space,
            version,
            metadata: Value::Null,
            check_order: CheckOrder::UNCHECKED,
        }
    }

    pub fn id(&self) -> &ResourceVersionId {
        &self.id
    }

    pub fn resource_config_id(&self) -> &ResourceConfigId {
        &self.resource_config_id
    }

    pub fn space(&self) -> &Space {
        &self.space
    }

    pub fn version(&self) -> &Value {
        &self.version
    }

    pub fn metadata(&self) -> &Value {
        &self.metadata
    }

    pub fn check_order(&self) -> CheckOrder {
        self.check_order
    }

    pub fn is_checked(&self) -> bool {
        !self.check_order.is_unchecked()
    }

    pub fn matches(&self, space: &Space, version: &Value) -> bool {
        &self.space == space && &self.version == version
    }

    /// Only reachable from the check-persistence path (`SaveVersions`).
    /// Never call this from a build-input/output save - referencing an
    /// existing version must not touch its check order (invariant 2 in §3).
    pub(crate) fn observe_check(&mut self, order: CheckOrder, metadata: Value) {
        debug_assert!(order >= self.check_order, "check_order must be monotone non-decreasing");
        self.check_order = order;
        self.metadata = metadata;
    }
}

/// Persistence-facing handle used only by the check-persistence path
/// (`radar_engine`'s `SaveVersions` adapter) to advance `check_order`
/// without exposing that capability on the entity's public API.
pub struct CheckObservation;

impl CheckObservation {
    pub fn apply(version: &mut ResourceVersion, order: CheckOrder, metadata: Value) {
        version.observe_check(order, metadata);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config_id() -> ResourceConfigId {
        ResourceConfigId::new()
    }

    #[test]
    fn new_unchecked_version_has_check_order_zero() {
        let version = ResourceVersion::new_unchecked(config_id(), Space::default_space(), json!({"ref": "abc"}));
        assert!(!version.is_checked());
        assert_eq!(version.check_order(), CheckOrder::UNCHECKED);
    }

    #[test]
    fn observing_a_check_sets_nonzero_order() {
        let mut version = ResourceVersion::new_unchecked(config_id(), Space::default_space(), json!({"ref": "abc"}));
        CheckObservation::apply(&mut version, CheckOrder::new(1), json!({"author": "me"}));
        assert!(version.is_checked());
        assert_eq!(version.check_order(), CheckOrder::new(1));
        assert_eq!(version.metadata(), &json!({"author": "me"}));
    }

    #[test]
    fn matches_compares_space_and_version_only() {
        let version = ResourceVersion::new_unchecked(config_id(), Space::default_space(), json!({"ref": "abc"}));
        assert!(version.matches(&Space::default_space(), &json!({"ref": "abc"})));
        assert!(!version.matches(&Space::default_space(), &json!({"ref": "other"})));
    }
}
