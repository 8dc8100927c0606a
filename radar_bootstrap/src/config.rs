// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Application Configuration
//!
//! Immutable configuration for the radar/tracker engine, built through a
//! fluent builder so the composition root can layer defaults, a config
//! file, environment variables, and CLI flags before freezing the result.

use std::time::Duration;

/// Logging verbosity, independent of the `tracing` crate so bootstrap
/// doesn't have to depend on it for this single enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Immutable, validated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    app_name: String,
    log_level: LogLevel,
    database_url: String,
    default_check_interval: Duration,
    lock_grace_period: Duration,
    tracker_interval: Duration,
    shutdown_grace_period: Duration,
    worker_name: String,
    verbose: bool,
}

impl AppConfig {
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn default_check_interval(&self) -> Duration {
        self.default_check_interval
    }

    pub fn lock_grace_period(&self) -> Duration {
        self.lock_grace_period
    }

    pub fn tracker_interval(&self) -> Duration {
        self.tracker_interval
    }

    pub fn shutdown_grace_period(&self) -> Duration {
        self.shutdown_grace_period
    }

    pub fn worker_name(&self) -> &str {
        &self.worker_name
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

/// Fluent builder for [`AppConfig`].
///
/// `build()` panics if `app_name` was never set, matching the composition
/// root's expectation that required fields are supplied by the CLI layer
/// before this is called. `try_build()` is for callers (like the CLI entry
/// point) that want to turn a missing field into a user-facing error
/// instead of a panic.
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    app_name: Option<String>,
    log_level: LogLevel,
    database_url: Option<String>,
    default_check_interval: Option<Duration>,
    lock_grace_period: Option<Duration>,
    tracker_interval: Option<Duration>,
    shutdown_grace_period: Option<Duration>,
    worker_name: Option<String>,
    verbose: bool,
}

impl AppConfigBuilder {
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn default_check_interval(mut self, interval: Duration) -> Self {
        self.default_check_interval = Some(interval);
        self
    }

    pub fn lock_grace_period(mut self, period: Duration) -> Self {
        self.lock_grace_period = Some(period);
        self
    }

    pub fn tracker_interval(mut self, interval: Duration) -> Self {
        self.tracker_interval = Some(interval);
        self
    }

    pub fn shutdown_grace_period(mut self, period: Duration) -> Self {
        self.shutdown_grace_period = Some(period);
        self
    }

    pub fn worker_name(mut self, name: impl Into<String>) -> Self {
        self.worker_name = Some(name.into());
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn build(self) -> AppConfig {
        self.try_build().expect("AppConfigBuilder::build called without required fields")
    }

    pub fn try_build(self) -> Result<AppConfig, String> {
        let app_name = self.app_name.ok_or_else(|| "app_name is required".to_string())?;

        Ok(AppConfig {
            app_name,
            log_level: self.log_level,
            database_url: self.database_url.unwrap_or_else(|| "sqlite::memory:".to_string()),
            default_check_interval: self.default_check_interval.unwrap_or(Duration::from_secs(60)),
            lock_grace_period: self.lock_grace_period.unwrap_or(Duration::from_secs(60)),
            tracker_interval: self.tracker_interval.unwrap_or(Duration::from_secs(10)),
            shutdown_grace_period: self.shutdown_grace_period.unwrap_or(Duration::from_secs(5)),
            worker_name: self.worker_name.unwrap_or_else(|| "default-worker".to_string()),
            verbose: self.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_with_minimum_fields() {
        let config = AppConfig::builder().app_name("radar").build();
        assert_eq!(config.app_name(), "radar");
        assert_eq!(config.log_level(), LogLevel::Info);
        assert_eq!(config.database_url(), "sqlite::memory:");
    }

    #[test]
    fn builder_with_all_fields() {
        let config = AppConfig::builder()
            .app_name("radar")
            .log_level(LogLevel::Debug)
            .database_url("sqlite://./radar.db")
            .default_check_interval(Duration::from_secs(30))
            .lock_grace_period(Duration::from_secs(45))
            .tracker_interval(Duration::from_secs(5))
            .shutdown_grace_period(Duration::from_secs(10))
            .worker_name("worker-1")
            .verbose(true)
            .build();

        assert_eq!(config.database_url(), "sqlite://./radar.db");
        assert_eq!(config.default_check_interval(), Duration::from_secs(30));
        assert_eq!(config.worker_name(), "worker-1");
        assert!(config.verbose());
    }

    #[test]
    #[should_panic(expected = "app_name is required")]
    fn build_panics_without_app_name() {
        let _ = AppConfig::builder().build();
    }

    #[test]
    fn try_build_returns_error_without_app_name() {
        let result = AppConfig::builder().try_build();
        assert!(result.is_err());
    }

    #[test]
    fn log_level_default_is_info() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn log_level_maps_to_tracing_level() {
        assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
        assert_eq!(LogLevel::Trace.to_tracing_level(), tracing::Level::TRACE);
    }

    #[test]
    fn config_is_clonable() {
        let config = AppConfig::builder().app_name("radar").build();
        let cloned = config.clone();
        assert_eq!(config.app_name(), cloned.app_name());
    }
}
