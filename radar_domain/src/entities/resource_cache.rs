// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # ResourceCache Entity
//!
//! Keyed by `(resource_config_id, space, version, params_digest)` and
//! shared across builds that request the same fetch, so concurrent get
//! steps for identical content converge on one cache row.

use crate::value_objects::{ResourceCacheId, ResourceConfigId, Space};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceCache {
    id: ResourceCacheId,
    resource_config_id: ResourceConfigId,
    space: Space,
    version: Value,
    params_digest: String,
}

impl ResourceCache {
    pub fn new(resource_config_id: ResourceConfigId, space: Space, version: Value, params: &Value) -> Self {
        Self {
            id: ResourceCacheId::new(),
            resource_config_id,
            space,
            version,
            params_digest: Self::digest_params(params),
        }
    }

    fn digest_params(params: &Value) -> String {
        let canonical = serde_json::to_vec(params).unwrap_or_default();
        hex::encode(Sha256::digest(canonical))
    }

    pub fn id(&self) -> &ResourceCacheId {
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

    pub fn params_digest(&self) -> &str {
        &self.params_digest
    }

    pub fn matches_key(&self, resource_config_id: &ResourceConfigId, space: &Space, version: &Value, params: &Value) -> bool {
        &self.resource_config_id == resource_config_id
            && &self.space == space
            && &self.version == version
            && self.params_digest == Self::digest_params(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_key_components_match() {
        let config_id = ResourceConfigId::new();
        let space = Space::default_space();
        let version = json!({"ref": "abc"});
        let params = json!({"depth": 1});
        let cache = ResourceCache::new(config_id.clone(), space.clone(), version.clone(), &params);
        assert!(cache.matches_key(&config_id, &space, &version, &params));
    }

    #[test]
    fn differing_params_do_not_match() {
        let config_id = ResourceConfigId::new();
        let space = Space::default_space();
        let version = json!({"ref": "abc"});
        let cache = ResourceCache::new(config_id.clone(), space.clone(), version.clone(), &json!({"depth": 1}));
        assert!(!cache.matches_key(&config_id, &space, &version, &json!({"depth": 2})));
    }
}
