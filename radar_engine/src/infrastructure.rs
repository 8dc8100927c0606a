// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure Layer
//!
//! Concrete adapters for the ports declared in `radar_domain::services` and
//! `radar_domain::repositories`: sqlite-backed repositories, a process
//! resource driver, a broadcast notification bus, an interval-gated sqlite
//! lock service, a system clock, credential interpolation, gzipped-tar
//! artifact streaming, and structured logging install. Only this layer and
//! `radar_bootstrap` perform I/O.

pub mod artifact;
pub mod clock;
pub mod credentials;
pub mod lock;
pub mod logging;
pub mod notification;
pub mod repositories;
pub mod resource_driver;

pub use artifact::ArtifactSource;
pub use clock::SystemClock;
pub use credentials::StaticCredentialVariables;
pub use lock::SqliteLockService;
pub use notification::BroadcastNotificationBus;
pub use repositories::{SqliteBuildRepository, SqlitePipelineRepository, SqliteResourceRepository};
pub use resource_driver::ProcessResourceDriver;
