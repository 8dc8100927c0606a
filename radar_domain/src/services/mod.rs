// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Service Ports
//!
//! Infrastructure-facing ports the application layer depends on by trait
//! object, implemented concretely in `radar-engine`:
//!
//! - [`Clock`]: wall time (C2)
//! - [`NotificationBus`]: listen/unlisten/notify (C1)
//! - [`LockService`]: interval-gated distributed locks (C3)
//! - [`ResourceDriver`]: external check/in/out scripts
//! - [`CredentialVariables`]: `((placeholder))` interpolation

pub mod clock;
pub mod credential_variables;
pub mod lock_service;
pub mod notification;
pub mod resource_driver;

pub use clock::Clock;
pub use credential_variables::CredentialVariables;
pub use lock_service::{LockHandle, LockService};
pub use notification::{NotificationBus, NotificationStream, CHANNEL_ATC_SHUTDOWN, CHANNEL_BUILD_STARTED};
pub use resource_driver::{DiscoveredVersion, FetchOutcome, PutOutcome, ResourceDriver};
