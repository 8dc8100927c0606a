// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! Hierarchical error type for the radar/build-tracker domain. Each variant
//! maps to a `category()` string consumed by `radar_bootstrap::exit_code`
//! to pick a sysexits.h-style process exit code, and to `is_recoverable()`
//! for retry decisions in the scanner and tracker loops.

use thiserror::Error;

/// Domain-specific errors for the radar / build-tracker system.
#[derive(Error, Debug, Clone)]
pub enum RadarError {
    #[error("invalid configuration: {0}")]
    ConfigError(String),

    #[error("lock unavailable: {key}")]
    LockUnavailable { key: String },

    #[error("resource check script failed: {0}")]
    DriverFailure(String),

    #[error("transient failure: {0}")]
    Transient(String),

    #[error("{0}")]
    Fatal(String),

    #[error("pipeline not found: {0}")]
    PipelineNotFound(String),

    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    #[error("build not found: {0}")]
    BuildNotFound(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("io error: {0}")]
    IoError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl RadarError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn lock_unavailable(key: impl Into<String>) -> Self {
        Self::LockUnavailable { key: key.into() }
    }

    pub fn driver_failure(msg: impl Into<String>) -> Self {
        Self::DriverFailure(msg.into())
    }

    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    pub fn fatal(msg: impl Into<String>) -> Self {
        Self::Fatal(msg.into())
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    pub fn database_error(msg: impl Into<String>) -> Self {
        Self::DatabaseError(msg.into())
    }

    /// Errors that justify a retry rather than tearing the worker down.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RadarError::LockUnavailable { .. } | RadarError::Transient(_))
    }

    /// Taxonomy string consumed by `radar_bootstrap::ExitCode::from_error_with_category`.
    pub fn category(&self) -> &'static str {
        match self {
            RadarError::ConfigError(_) => "config",
            RadarError::LockUnavailable { .. } => "lock_unavailable",
            RadarError::DriverFailure(_) => "driver_failure",
            RadarError::Transient(_) => "transient",
            RadarError::Fatal(_) => "fatal",
            RadarError::PipelineNotFound(_) => "pipeline",
            RadarError::ResourceNotFound(_) => "resource",
            RadarError::BuildNotFound(_) => "build",
            RadarError::ValidationError(_) => "validation",
            RadarError::SerializationError(_) => "serialization",
            RadarError::DatabaseError(_) => "database",
            RadarError::IoError(_) => "io",
            RadarError::InternalError(_) => "internal",
        }
    }

    /// The raw message a variant carries, without the category prefix
    /// `Display` adds. Used to persist `check_error`-style fields where the
    /// stored text must match the underlying failure's own wording (e.g. a
    /// duration parser's literal error text) rather than our wrapper's.
    pub fn message(&self) -> &str {
        match self {
            RadarError::ConfigError(m)
            | RadarError::DriverFailure(m)
            | RadarError::Transient(m)
            | RadarError::Fatal(m)
            | RadarError::PipelineNotFound(m)
            | RadarError::ResourceNotFound(m)
            | RadarError::BuildNotFound(m)
            | RadarError::ValidationError(m)
            | RadarError::SerializationError(m)
            | RadarError::DatabaseError(m)
            | RadarError::IoError(m)
            | RadarError::InternalError(m) => m,
            RadarError::LockUnavailable { key } => key,
        }
    }
}

impl From<std::io::Error> for RadarError {
    fn from(err: std::io::Error) -> Self {
        RadarError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for RadarError {
    fn from(err: serde_json::Error) -> Self {
        RadarError::SerializationError(err.to_string())
    }
}
