// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Radar: the Resource and ResourceType scanners (§4.1).
//!
//! One `RadarScanner` is shared by every per-resource loop in the process;
//! `scan_resource`/`scan_resource_type` run a single check and return the
//! interval the caller should wait before the next tick. The long-running
//! loop (tick, pipeline-paused re-check, lock retry) lives at the
//! composition root so it can be cancelled the same way the tracker runner
//! is (§9 "Run(ctx, ready)").

use futures::StreamExt;
use radar_domain::{
    Clock, CredentialVariables, DiscoveredVersion, LockService, PipelineId, PipelineRepository, RadarError,
    ResourceDriver, ResourceId, ResourceRepository, ResourceType, ResourceTypeId, Space,
};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct RadarScanner {
    pipelines: Arc<dyn PipelineRepository>,
    resources: Arc<dyn ResourceRepository>,
    lock_service: Arc<dyn LockService>,
    driver: Arc<dyn ResourceDriver>,
    credentials: Arc<dyn CredentialVariables>,
    clock: Arc<dyn Clock>,
}

impl RadarScanner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pipelines: Arc<dyn PipelineRepository>,
        resources: Arc<dyn ResourceRepository>,
        lock_service: Arc<dyn LockService>,
        driver: Arc<dyn ResourceDriver>,
        credentials: Arc<dyn CredentialVariables>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            pipelines,
            resources,
            lock_service,
            driver,
            credentials,
            clock,
        }
    }

    /// Runs one check of a Resource (§4.1 rules 1-7). Returns the interval
    /// the caller should wait before the next scheduled tick.
    pub async fn scan_resource(&self, resource_id: &ResourceId, default_interval: Duration, immediate: bool) -> Result<Duration, RadarError> {
        let mut resource = self
            .resources
            .find_resource(resource_id)
            .await?
            .ok_or_else(|| RadarError::ResourceNotFound(resource_id.to_string()))?;

        let pipeline = self
            .pipelines
            .find_by_id(resource.pipeline_id())
            .await?
            .ok_or_else(|| RadarError::PipelineNotFound(resource.pipeline_id().to_string()))?;
        if pipeline.should_skip_check() {
            return Ok(default_interval);
        }

        let interval = match resource.resolve_check_interval(radar_domain::CheckInterval::from_duration(default_interval)) {
            Ok(interval) => interval,
            Err(err) => {
                resource.set_check_error(err.message());
                self.resources.update_resource(&resource).await?;
                return Err(err);
            }
        };

        let outcome = self.check_resource_once(&mut resource, interval.as_duration(), immediate).await;
        match &outcome {
            Ok(()) => resource.clear_check_error(),
            Err(err) => resource.set_check_error(err.message()),
        }
        self.resources.update_resource(&resource).await?;
        outcome.map(|()| interval.as_duration())
    }

    async fn check_resource_once(&self, resource: &mut radar_domain::Resource, interval: Duration, immediate: bool) -> Result<(), RadarError> {
        let source = self.credentials.interpolate(resource.source()).await?;
        let versioned_types = self
            .resolve_versioned_types(resource.pipeline_id(), resource.resource_type(), &mut HashSet::new())
            .await?;

        let config = self
            .resources
            .find_or_create_resource_config(resource.resource_type(), &source, &versioned_types)
            .await?;
        self.resources.bind_resource_config(resource.id(), config.id()).await?;
        resource.bind_resource_config(config.id().clone());

        let Some(handle) = self.acquire_checking_lock(config.id().to_string(), interval, immediate).await? else {
            return Ok(());
        };
        let outcome = self.run_check(&source, &config).await;
        handle.release().await;
        outcome
    }

    /// Runs one check of a ResourceType (§4.1 "ResourceType scanner").
    /// Unlike a Resource, the outcome updates the single `version` field
    /// rather than a history.
    pub async fn scan_resource_type(
        &self,
        pipeline_id: &PipelineId,
        resource_type_id: &ResourceTypeId,
        default_interval: Duration,
        immediate: bool,
    ) -> Result<Duration, RadarError> {
        let types = self.resources.list_resource_types(pipeline_id).await?;
        let resource_type = types
            .into_iter()
            .find(|t| t.id() == resource_type_id)
            .ok_or_else(|| RadarError::ResourceNotFound(resource_type_id.to_string()))?;

        self.scan_resource_type_entity(resource_type, default_interval, immediate, &mut HashSet::new())
            .await
    }

    /// Same algorithm as [`Self::scan_resource_type`], but operating on an
    /// already-fetched entity and a cycle guard - used both by the public
    /// entry point and by recursive custom-type resolution.
    async fn scan_resource_type_entity(
        &self,
        mut resource_type: ResourceType,
        default_interval: Duration,
        immediate: bool,
        visiting: &mut HashSet<ResourceTypeId>,
    ) -> Result<Duration, RadarError> {
        if !visiting.insert(resource_type.id().clone()) {
            return Err(RadarError::fatal(format!("cyclic resource type dependency at {}", resource_type.name())));
        }

        let pipeline = self
            .pipelines
            .find_by_id(resource_type.pipeline_id())
            .await?
            .ok_or_else(|| RadarError::PipelineNotFound(resource_type.pipeline_id().to_string()))?;
        if pipeline.should_skip_check() {
            return Ok(default_interval);
        }

        let interval = match radar_domain::CheckInterval::resolve(resource_type.check_every(), radar_domain::CheckInterval::from_duration(default_interval)) {
            Ok(interval) => interval,
            Err(err) => {
                resource_type.set_check_error(err.message());
                self.resources.update_resource_type(&resource_type).await?;
                return Err(err);
            }
        };

        let outcome = self.check_resource_type_once(&mut resource_type, interval.as_duration(), immediate, visiting).await;
        match &outcome {
            Ok(_) => resource_type.clear_check_error(),
            Err(err) => resource_type.set_check_error(err.message()),
        }
        self.resources.update_resource_type(&resource_type).await?;
        outcome.map(|_| interval.as_duration())
    }

    async fn check_resource_type_once(
        &self,
        resource_type: &mut ResourceType,
        interval: Duration,
        immediate: bool,
        visiting: &mut HashSet<ResourceTypeId>,
    ) -> Result<(), RadarError> {
        let source = self.credentials.interpolate(resource_type.source()).await?;
        let versioned_types = self
            .resolve_versioned_types(resource_type.pipeline_id(), resource_type.resource_type(), visiting)
            .await?;

        let config = self
            .resources
            .find_or_create_resource_config(resource_type.resource_type(), &source, &versioned_types)
            .await?;
        resource_type.bind_resource_config(config.id().clone());

        let Some(handle) = self.acquire_checking_lock(config.id().to_string(), interval, immediate).await? else {
            return Ok(());
        };
        let discovered = self.discover_versions(&source, config.latest_versions()).await;
        handle.release().await;
        let discovered = discovered?;

        if let Some(latest) = discovered.last() {
            resource_type.set_version(latest.version.clone());
        }
        Ok(())
    }

    /// `ScanFromVersion(name, from)` (§4.1): acquires the lock in immediate
    /// mode and issues one check seeded by the operator-supplied `from`
    /// version rather than the config's own per-space latest.
    pub async fn scan_from_version(&self, resource_id: &ResourceId, space: Space, from: Value) -> Result<(), RadarError> {
        let resource = self
            .resources
            .find_resource(resource_id)
            .await?
            .ok_or_else(|| RadarError::ResourceNotFound(resource_id.to_string()))?;

        let config_id = resource
            .resource_config_id()
            .ok_or_else(|| RadarError::config("resource has no bound resource_config; run a scheduled check first"))?;
        let config = self
            .resources
            .find_resource_config(config_id)
            .await?
            .ok_or_else(|| RadarError::internal_error("resource_config vanished"))?;

        let handle = self
            .lock_service
            .try_acquire(&config_id.to_string(), Duration::from_secs(1), true)
            .await?
            .ok_or_else(|| RadarError::lock_unavailable(config_id.to_string()))?;

        let source = self.credentials.interpolate(resource.source()).await?;
        let current: Vec<(String, Value)> = vec![(space.as_str().to_string(), from)];
        let outcome = self.run_check_from(&source, &config, &current).await;
        handle.release().await;
        outcome
    }

    async fn acquire_checking_lock(&self, key: String, interval: Duration, immediate: bool) -> Result<Option<Box<dyn radar_domain::LockHandle>>, RadarError> {
        loop {
            match self.lock_service.try_acquire(&key, interval, immediate).await? {
                Some(handle) => return Ok(Some(handle)),
                None if immediate => {
                    self.clock.sleep(Duration::from_secs(1)).await;
                    continue;
                }
                None => return Ok(None),
            }
        }
    }

    async fn run_check(&self, source: &Value, config: &radar_domain::ResourceConfig) -> Result<(), RadarError> {
        let current: Vec<(String, Value)> = config.latest_versions().iter().map(|(s, v)| (s.as_str().to_string(), v.clone())).collect();
        self.run_check_from(source, config, &current).await
    }

    async fn run_check_from(&self, source: &Value, config: &radar_domain::ResourceConfig, current: &[(String, Value)]) -> Result<(), RadarError> {
        let discovered = self.discover_versions(source, current).await?;

        let mut by_space: HashMap<String, Vec<(Value, Value)>> = HashMap::new();
        for item in &discovered {
            by_space.entry(item.space.clone()).or_default().push((item.version.clone(), item.metadata.clone()));
        }

        for (space_name, versions) in &by_space {
            let space = Space::new(space_name.clone())?;
            self.resources.save_versions(config.id(), &space, versions).await?;
            if let Some((version, _)) = versions.last() {
                self.resources.save_space_latest_version(config.id(), &space, version).await?;
            }
        }
        info!(resource_config_id = %config.id(), discovered = discovered.len(), "check finished");
        Ok(())
    }

    async fn discover_versions(&self, source: &Value, current: &[(String, Value)]) -> Result<Vec<DiscoveredVersion>, RadarError> {
        let mut stream = self.driver.check(source, current).await?;
        let mut discovered = Vec::new();
        while let Some(item) = stream.next().await {
            discovered.push(item?);
        }
        Ok(discovered)
    }

    /// Resolves a resource/type's transitive custom-`resource_types` chain
    /// (§4.1 rule 2). A base type (no pipeline-defined `ResourceType` with a
    /// matching name) contributes nothing. A custom type without a
    /// discovered version is scanned first so its version is concrete;
    /// `visiting` rejects a cyclic chain instead of recursing forever.
    fn resolve_versioned_types<'a>(
        &'a self,
        pipeline_id: &'a PipelineId,
        type_name: &'a str,
        visiting: &'a mut HashSet<ResourceTypeId>,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<Value>, RadarError>> + Send + 'a>> {
        Box::pin(async move {
            let types = self.resources.list_resource_types(pipeline_id).await?;
            let Some(matching) = types.into_iter().find(|t| t.shadows(type_name)) else {
                return Ok(Vec::new());
            };

            let resolved = if matching.has_version() {
                matching
            } else {
                let type_id = matching.id().clone();
                self.scan_resource_type_entity(matching, Duration::from_secs(60), true, visiting).await?;
                self.resources
                    .list_resource_types(pipeline_id)
                    .await?
                    .into_iter()
                    .find(|t| t.id() == &type_id)
                    .ok_or_else(|| RadarError::internal_error("resource_type vanished during scan"))?
            };

            let mut chain = self.resolve_versioned_types(pipeline_id, resolved.resource_type(), visiting).await?;
            chain.push(serde_json::json!({
                "name": resolved.name(),
                "type": resolved.resource_type(),
                "version": resolved.version().cloned().unwrap_or(Value::Null),
            }));
            Ok(chain)
        })
    }
}
