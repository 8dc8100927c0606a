// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Radar Engine
//!
//! The impure half of the resource-version tracking and build-scheduling
//! core: sqlite-backed repository adapters, the process-spawning resource
//! driver, the credential-interpolation and distributed-lock adapters, and
//! the application services (`RadarScanner`, `VersionsDbService`,
//! `BuildTrackerRunner`, `GetStepExecutor`) that orchestrate `radar_domain`
//! ports into the units named in §4. The binary entry point in `main.rs`
//! is the composition root that wires these together; `radar_bootstrap`
//! owns CLI parsing, signal handling, and shutdown coordination.

pub mod application;
pub mod infrastructure;

pub use application::{BuildTrackerRunner, GetStepExecutor, RadarScanner, VersionsDbService};
