// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Get-step executor (§4.4): fetches one chosen version of a resource into
//! a worker volume, with at-most-once caching keyed by a content-hash lock
//! name.

use crate::infrastructure::artifact::ArtifactSource;
use radar_domain::{CredentialVariables, LockName, LockService, RadarError, ResourceConfigId, ResourceDriver, ResourceRepository, Space};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Everything the get-step needs that doesn't come from the build engine's
/// own run state: resource type, interpolated source/params, chosen space
/// and version, and the worker the fetch will run on.
pub struct GetStepRequest {
    pub resource_type: String,
    pub source: Value,
    pub params: Value,
    pub space: Space,
    pub version: Value,
    pub resource_config_id: ResourceConfigId,
    pub worker_name: String,
}

/// Terminal outcome of the step (§4.4 state machine: `Pending -> Fetching
/// -> (Succeeded | Failed(exit) | Errored)`). `Errored` is represented by
/// `Err` rather than a variant - the build engine has no `Finished` call to
/// make in that case.
pub enum GetStepOutcome {
    Succeeded { metadata: Value, artifact: ArtifactSource },
    Failed { exit_status: i32 },
}

pub struct GetStepExecutor {
    resources: Arc<dyn ResourceRepository>,
    lock_service: Arc<dyn LockService>,
    driver: Arc<dyn ResourceDriver>,
    credentials: Arc<dyn CredentialVariables>,
}

impl GetStepExecutor {
    pub fn new(
        resources: Arc<dyn ResourceRepository>,
        lock_service: Arc<dyn LockService>,
        driver: Arc<dyn ResourceDriver>,
        credentials: Arc<dyn CredentialVariables>,
    ) -> Self {
        Self {
            resources,
            lock_service,
            driver,
            credentials,
        }
    }

    /// Locks on the content-hash key (§8 scenario 6) so two concurrent gets
    /// for the same `(type, space, version, source, params, worker)` never
    /// fetch twice, then fetches and caches.
    pub async fn execute(&self, request: GetStepRequest) -> Result<GetStepOutcome, RadarError> {
        let source = self.credentials.interpolate(&request.source).await?;
        let params = self.credentials.interpolate(&request.params).await?;

        let lock_name = LockName::compute(&request.resource_type, request.space.as_str(), &request.version, &source, &params, &request.worker_name)?;

        let handle = self
            .lock_service
            .try_acquire(lock_name.as_str(), Duration::from_secs(1), true)
            .await?
            .ok_or_else(|| RadarError::lock_unavailable(lock_name.to_string()))?;

        let outcome = self.fetch_with_cache(&request, &source, &params).await;
        handle.release().await;
        outcome
    }

    async fn fetch_with_cache(&self, request: &GetStepRequest, source: &Value, params: &Value) -> Result<GetStepOutcome, RadarError> {
        self.resources
            .find_or_create_resource_cache(&request.resource_config_id, &request.space, &request.version, params)
            .await?;

        // §4.4 step 3 always creates a check_order=0 placeholder here rather
        // than branching on a separate not-found outcome: that is exactly
        // the "I asked for X but haven't observed it" case, not a reason to
        // skip the fetch. A request errors only if the repository call
        // itself errors.
        self.resources
            .find_or_create_unchecked_version(&request.resource_config_id, &request.space, &request.version)
            .await?;

        let outcome = self.driver.fetch(source, request.space.as_str(), &request.version, params).await?;
        if outcome.exit_status != 0 {
            return Ok(GetStepOutcome::Failed { exit_status: outcome.exit_status });
        }

        let volume_path = outcome
            .volume_path
            .ok_or_else(|| RadarError::internal_error("driver reported success but published no volume"))?;

        Ok(GetStepOutcome::Succeeded {
            metadata: outcome.metadata,
            artifact: ArtifactSource::from_archive_path(volume_path),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_archive_reports_file_not_found() {
        let archive = tempfile::NamedTempFile::new().unwrap();
        {
            use flate2::write::GzEncoder;
            use flate2::Compression;
            let encoder = GzEncoder::new(archive.reopen().unwrap(), Compression::default());
            let builder = tar::Builder::new(encoder);
            builder.into_inner().unwrap().finish().unwrap();
        }
        let source = ArtifactSource::from_archive_path(archive.path().to_path_buf());
        assert!(source.stream_file("anything").is_err());
    }
}
