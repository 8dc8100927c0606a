// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Resource Repository Port
//!
//! Persistence contract for resources, resource types, resource configs,
//! and the resource-versions they own. Mirrors the operations named in
//! §4.1/§4.2: `FindOrCreateResourceConfig`, `SaveVersions`,
//! `SaveSpaceLatestVersion`, `FindUncheckedVersion`, enable/disable.

use crate::entities::{Resource, ResourceCache, ResourceConfig, ResourceType, ResourceVersion};
use crate::error::RadarError;
use crate::value_objects::{CheckOrder, PipelineId, ResourceConfigId, ResourceId, ResourceTypeId, ResourceVersionId, Space};
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait ResourceRepository: Send + Sync {
    async fn save_resource(&self, resource: &Resource) -> Result<(), RadarError>;

    async fn find_resource(&self, id: &ResourceId) -> Result<Option<Resource>, RadarError>;

    async fn find_resource_by_name(&self, pipeline_id: &PipelineId, name: &str) -> Result<Option<Resource>, RadarError>;

    async fn list_resources(&self, pipeline_id: &PipelineId) -> Result<Vec<Resource>, RadarError>;

    async fn update_resource(&self, resource: &Resource) -> Result<(), RadarError>;

    async fn save_resource_type(&self, resource_type: &ResourceType) -> Result<(), RadarError>;

    async fn list_resource_types(&self, pipeline_id: &PipelineId) -> Result<Vec<ResourceType>, RadarError>;

    async fn update_resource_type(&self, resource_type: &ResourceType) -> Result<(), RadarError>;

    /// Finds the `ResourceConfig` matching `(type, source, resource_types_digest)`,
    /// creating it if no matching row exists (§4.1 rule 2).
    async fn find_or_create_resource_config(
        &self,
        resource_type: &str,
        source: &Value,
        versioned_types: &[Value],
    ) -> Result<ResourceConfig, RadarError>;

    async fn find_resource_config(&self, id: &ResourceConfigId) -> Result<Option<ResourceConfig>, RadarError>;

    /// Order-preserving, idempotent by `(resource_config_id, space, version)`;
    /// monotonically assigns `check_order` (§4.1 rule 5).
    async fn save_versions(
        &self,
        resource_config_id: &ResourceConfigId,
        space: &Space,
        versions: &[(Value, Value)],
    ) -> Result<(), RadarError>;

    async fn save_space_latest_version(
        &self,
        resource_config_id: &ResourceConfigId,
        space: &Space,
        version: &Value,
    ) -> Result<(), RadarError>;

    /// Direct query: returns the latest version for each space regardless
    /// of disabled status (§3 invariant 3, "resource page" query).
    async fn latest_versions(&self, resource_config_id: &ResourceConfigId) -> Result<Vec<ResourceVersion>, RadarError>;

    /// Creates a `check_order = 0` placeholder if no row for `(space, version)`
    /// exists yet (§4.4 rule 3).
    async fn find_or_create_unchecked_version(
        &self,
        resource_config_id: &ResourceConfigId,
        space: &Space,
        version: &Value,
    ) -> Result<ResourceVersion, RadarError>;

    async fn find_version(&self, id: &ResourceVersionId) -> Result<Option<ResourceVersion>, RadarError>;

    async fn disable_version(&self, resource_id: &ResourceId, version_id: &ResourceVersionId) -> Result<(), RadarError>;

    async fn enable_version(&self, resource_id: &ResourceId, version_id: &ResourceVersionId) -> Result<(), RadarError>;

    async fn is_disabled(&self, resource_id: &ResourceId, version_id: &ResourceVersionId) -> Result<bool, RadarError>;

    async fn set_resource_check_error(&self, resource_id: &ResourceId, message: Option<&str>) -> Result<(), RadarError>;

    async fn set_resource_type_check_error(&self, resource_type_id: &ResourceTypeId, message: Option<&str>) -> Result<(), RadarError>;

    async fn bind_resource_config(&self, resource_id: &ResourceId, resource_config_id: &ResourceConfigId) -> Result<(), RadarError>;

    /// Highest `check_order` assigned so far within `(resource_config_id, space)`,
    /// used to compute the next order at check-persistence time.
    async fn max_check_order(&self, resource_config_id: &ResourceConfigId, space: &Space) -> Result<CheckOrder, RadarError>;

    /// Finds the `ResourceCache` matching `(resource_config_id, space, version, params)`,
    /// creating it if no matching row exists (§4.4 step 3).
    async fn find_or_create_resource_cache(
        &self,
        resource_config_id: &ResourceConfigId,
        space: &Space,
        version: &Value,
        params: &Value,
    ) -> Result<ResourceCache, RadarError>;

    /// Every `(resource_id, ResourceVersion)` pair owned, through its bound
    /// `resource_config_id`, by a Resource of `pipeline_id`. Used by
    /// `VersionsDbService` to assemble projection candidates (§4.2); disabled
    /// status is queried separately per pair via `is_disabled`.
    async fn list_versions_for_pipeline(&self, pipeline_id: &PipelineId) -> Result<Vec<(ResourceId, ResourceVersion)>, RadarError>;
}
