// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Radar Domain
//!
//! Pure business logic for the resource-version tracking and
//! build-scheduling core: entities, value objects, repository/service
//! ports, and the `VersionsDb` projection. No I/O, no `sqlx`, no `tokio`
//! runtime dependency beyond the trait signatures in `services` - those
//! are implemented against real infrastructure in `radar-engine`.
//!
//! ## Module Structure
//!
//! - `value_objects` - `PipelineId`/`ResourceId`/... , `CheckOrder`, `Space`,
//!   `CheckInterval`, `LockName`
//! - `entities` - `Pipeline`, `Resource`, `ResourceType`, `ResourceConfig`,
//!   `ResourceVersion`, `Job`, `Build`, `BuildInput`, `BuildOutput`,
//!   `ResourceCache`
//! - `error` - `RadarError`, the domain-wide error taxonomy
//! - `repositories` - persistence ports (`PipelineRepository`,
//!   `ResourceRepository`, `BuildRepository`)
//! - `services` - infrastructure ports (`Clock`, `NotificationBus`,
//!   `LockService`, `ResourceDriver`, `CredentialVariables`)
//! - `versions_db` - the pure `VersionsDb` projection (§4.2)

pub mod entities;
pub mod error;
pub mod repositories;
pub mod services;
pub mod value_objects;
pub mod versions_db;

pub use entities::{
    Build, BuildInput, BuildOutput, BuildStatus, CheckObservation, Job, Pipeline, Resource, ResourceCache, ResourceConfig,
    ResourceType, ResourceVersion,
};
pub use error::RadarError;
pub use repositories::{BuildRepository, PipelineRepository, ResourceRepository};
pub use services::{
    Clock, CredentialVariables, DiscoveredVersion, FetchOutcome, LockHandle, LockService, NotificationBus, NotificationStream,
    PutOutcome, ResourceDriver, CHANNEL_ATC_SHUTDOWN, CHANNEL_BUILD_STARTED,
};
pub use value_objects::{
    BuildId, CheckInterval, CheckOrder, JobId, LockName, PipelineId, ResourceCacheId, ResourceConfigId, ResourceId,
    ResourceTypeId, ResourceVersionId, Space,
};
pub use versions_db::{CandidateInput, CandidateOutput, CandidateVersion, VersionsDb};
