// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # ResourceConfig Entity
//!
//! Two resources with identical `(type, source, resource_types_digest)`
//! share a single `ResourceConfig` row, reference-counted by the set of
//! Resources/ResourceTypes pointing at it (invariant 5 in §3).

use crate::value_objects::{ResourceConfigId, Space};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    id: ResourceConfigId,
    resource_type: String,
    source: Value,
    resource_types_digest: String,
    latest_versions: Vec<(Space, Value)>,
}

impl ResourceConfig {
    pub fn new(resource_type: impl Into<String>, source: Value, versioned_types: &[Value]) -> Self {
        Self {
            id: ResourceConfigId::new(),
            resource_type: resource_type.into(),
            source,
            resource_types_digest: Self::digest_types(versioned_types),
            latest_versions: Vec::new(),
        }
    }

    /// Captures the transitive set of custom-type versions used to produce
    /// this config, so a later change to an upstream type version yields a
    /// distinct `ResourceConfig` row rather than silently reusing this one.
    fn digest_types(versioned_types: &[Value]) -> String {
        let canonical = serde_json::to_vec(versioned_types).unwrap_or_default();
        hex::encode(Sha256::digest(canonical))
    }

    pub fn id(&self) -> &ResourceConfigId {
        &self.id
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn source(&self) -> &Value {
        &self.source
    }

    pub fn resource_types_digest(&self) -> &str {
        &self.resource_types_digest
    }

    /// Matches the `(type, source, resource_types_digest)` identity used to
    /// decide whether two resources should share a config row.
    pub fn identity_matches(&self, resource_type: &str, source: &Value, resource_types_digest: &str) -> bool {
        self.resource_type == resource_type && &self.source == source && self.resource_types_digest == resource_types_digest
    }

    /// Current per-space latest versions, as consulted by `check`'s `from` argument (§4.1 rule 4).
    pub fn latest_versions(&self) -> &[(Space, Value)] {
        &self.latest_versions
    }

    pub fn latest_version_for_space(&self, space: &Space) -> Option<&Value> {
        self.latest_versions.iter().find(|(s, _)| s == space).map(|(_, v)| v)
    }

    /// Replaces the latest version for `space`, or appends a new entry
    /// (§8 scenario 1: later saves for the same space win).
    pub fn save_space_latest_version(&mut self, space: Space, version: Value) {
        if let Some(entry) = self.latest_versions.iter_mut().find(|(s, _)| *s == space) {
            entry.1 = version;
        } else {
            self.latest_versions.push((space, version));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_type_source_and_types_digest_share_identity() {
        let config = ResourceConfig::new("git", json!({"uri": "x"}), &[]);
        assert!(config.identity_matches("git", &json!({"uri": "x"}), config.resource_types_digest()));
    }

    #[test]
    fn differing_versioned_types_change_digest() {
        let a = ResourceConfig::new("git", json!({}), &[json!({"name": "t", "version": "1"})]);
        let b = ResourceConfig::new("git", json!({}), &[json!({"name": "t", "version": "2"})]);
        assert_ne!(a.resource_types_digest(), b.resource_types_digest());
    }

    #[test]
    fn later_save_wins_for_same_space() {
        let mut config = ResourceConfig::new("git", json!({}), &[]);
        let space = Space::default_space();
        config.save_space_latest_version(space.clone(), json!({"version": "1"}));
        config.save_space_latest_version(space.clone(), json!({"version": "2"}));
        assert_eq!(config.latest_version_for_space(&space), Some(&json!({"version": "2"})));
        assert_eq!(config.latest_versions().len(), 1);
    }
}
