// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Structured logging install (§10.1).
//!
//! Installed exactly once, from `main.rs`. Nothing under `application` or
//! `infrastructure` constructs a subscriber - they only call
//! `tracing::{debug,info,warn,error}!` at their call sites.

use radar_bootstrap::config::LogLevel;
use tracing_subscriber::EnvFilter;

/// Builds the `EnvFilter` for the process: `RADAR_LOG`, then `RUST_LOG`,
/// then the configured default level, in that precedence order.
fn env_filter(default_level: LogLevel) -> EnvFilter {
    if let Ok(directive) = std::env::var("RADAR_LOG") {
        return EnvFilter::new(directive);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.to_tracing_level().to_string()))
}

/// Installs the global `tracing` subscriber. Must be called once, before any
/// scanner or tracker task is spawned.
pub fn init(default_level: LogLevel) {
    tracing_subscriber::fmt().with_env_filter(env_filter(default_level)).with_target(true).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_filter_falls_back_to_configured_default_level() {
        std::env::remove_var("RADAR_LOG");
        std::env::remove_var("RUST_LOG");
        let filter = env_filter(LogLevel::Warn);
        assert_eq!(filter.to_string(), "warn");
    }
}
