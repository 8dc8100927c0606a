// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Entities
//!
//! Entities with identity that persists through state changes: [`Pipeline`],
//! [`Resource`], [`ResourceType`], [`ResourceConfig`], [`ResourceVersion`],
//! [`Job`], [`Build`], [`BuildInput`], [`BuildOutput`], [`ResourceCache`].

pub mod build;
pub mod build_input;
pub mod build_output;
pub mod job;
pub mod pipeline;
pub mod resource;
pub mod resource_cache;
pub mod resource_config;
pub mod resource_type;
pub mod resource_version;

pub use build::{Build, BuildStatus};
pub use build_input::BuildInput;
pub use build_output::BuildOutput;
pub use job::Job;
pub use pipeline::Pipeline;
pub use resource::Resource;
pub use resource_cache::ResourceCache;
pub use resource_config::ResourceConfig;
pub use resource_type::ResourceType;
pub use resource_version::{CheckObservation, ResourceVersion};
