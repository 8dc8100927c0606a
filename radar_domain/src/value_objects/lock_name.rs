// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `LockName` - the get-step's at-most-once-fetch lock key.
//!
//! Computed as the hex-encoded SHA-256 digest of a canonical JSON object
//! with a fixed field order: `type, space, version, source, params,
//! worker_name`. Two get-steps that would fetch byte-identical content on
//! the same worker always compute the same lock name, so only one of them
//! performs the fetch.

use crate::error::RadarError;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct LockName(String);

/// Field order here is load-bearing: it fixes the canonical JSON encoding
/// that feeds the digest.
#[derive(Serialize)]
struct LockNameFields<'a> {
    #[serde(rename = "type")]
    resource_type: &'a str,
    space: &'a str,
    version: &'a Value,
    source: &'a Value,
    params: &'a Value,
    worker_name: &'a str,
}

impl LockName {
    pub fn compute(
        resource_type: &str,
        space: &str,
        version: &Value,
        source: &Value,
        params: &Value,
        worker_name: &str,
    ) -> Result<Self, RadarError> {
        let fields = LockNameFields {
            resource_type,
            space,
            version,
            source,
            params,
            worker_name,
        };
        let canonical = serde_json::to_vec(&fields)?;
        let digest = Sha256::digest(&canonical);
        Ok(Self(hex::encode(digest)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LockName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn matches_known_digest() {
        let version = json!({"some-version": "some-value"});
        let source = json!({"some": "super-secret-source"});
        let params = json!({"some-param": "some-value"});

        let lock_name =
            LockName::compute("some-resource-type", "space", &version, &source, &params, "fake-worker").unwrap();

        let expected_input = r#"{"type":"some-resource-type","space":"space","version":{"some-version":"some-value"},"source":{"some":"super-secret-source"},"params":{"some-param":"some-value"},"worker_name":"fake-worker"}"#;
        let expected = hex::encode(Sha256::digest(expected_input.as_bytes()));
        assert_eq!(lock_name.as_str(), expected);
    }

    #[test]
    fn differing_worker_name_changes_lock_name() {
        let v = json!({});
        let a = LockName::compute("t", "s", &v, &v, &v, "worker-a").unwrap();
        let b = LockName::compute("t", "s", &v, &v, &v, "worker-b").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn identical_inputs_produce_identical_lock_names() {
        let v = json!({"k": "v"});
        let a = LockName::compute("t", "s", &v, &v, &v, "w").unwrap();
        let b = LockName::compute("t", "s", &v, &v, &v, "w").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn is_64_hex_characters() {
        let v = json!({});
        let lock_name = LockName::compute("t", "s", &v, &v, &v, "w").unwrap();
        assert_eq!(lock_name.as_str().len(), 64);
        assert!(lock_name.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
