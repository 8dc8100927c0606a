// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite-backed implementations of the `radar_domain` repository ports.

pub mod build_repository_impl;
pub mod pipeline_repository_impl;
pub mod resource_repository_impl;
pub mod schema;

pub use build_repository_impl::SqliteBuildRepository;
pub use pipeline_repository_impl::SqlitePipelineRepository;
pub use resource_repository_impl::SqliteResourceRepository;
