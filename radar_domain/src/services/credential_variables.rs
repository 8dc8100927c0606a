// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Credential Variables Port
//!
//! Interpolates `"((placeholder))"` references inside `source`/`params`
//! before they reach a resource driver or feed the get-step lock name
//! (§4.4 rule 1). The concrete credential-provider plumbing is out of
//! scope (§1); only the substitution contract is specified here.

use crate::error::RadarError;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait CredentialVariables: Send + Sync {
    /// Returns a copy of `value` with every `"((name))"` string replaced by
    /// its resolved credential. Missing variables are a `ConfigError`.
    async fn interpolate(&self, value: &Value) -> Result<Value, RadarError>;
}
