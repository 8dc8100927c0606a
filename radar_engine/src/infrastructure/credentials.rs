// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Map-backed [`CredentialVariables`] (§4.4 rule 1, §1 "credential-provider
//! plumbing" Non-goal).
//!
//! The domain only specifies the substitution contract - `"((name))"`
//! replaced by a resolved value. This adapter resolves against a flat
//! in-process map, the simplest provider that satisfies the contract;
//! wiring an external vault/secret-store is out of scope.

use async_trait::async_trait;
use radar_domain::{CredentialVariables, RadarError};
use serde_json::Value;
use std::collections::HashMap;

pub struct StaticCredentialVariables {
    variables: HashMap<String, Value>,
}

impl StaticCredentialVariables {
    pub fn new(variables: HashMap<String, Value>) -> Self {
        Self { variables }
    }

    fn substitute(&self, value: &Value) -> Result<Value, RadarError> {
        match value {
            Value::String(s) => {
                if let Some(name) = s.strip_prefix("((").and_then(|s| s.strip_suffix("))")) {
                    self.variables
                        .get(name)
                        .cloned()
                        .ok_or_else(|| RadarError::config(format!("unresolved credential variable: {name}")))
                } else {
                    Ok(value.clone())
                }
            }
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.substitute(item)?);
                }
                Ok(Value::Array(out))
            }
            Value::Object(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (key, val) in map {
                    out.insert(key.clone(), self.substitute(val)?);
                }
                Ok(Value::Object(out))
            }
            other => Ok(other.clone()),
        }
    }
}

#[async_trait]
impl CredentialVariables for StaticCredentialVariables {
    async fn interpolate(&self, value: &Value) -> Result<Value, RadarError> {
        self.substitute(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn substitutes_known_placeholder() {
        let mut variables = HashMap::new();
        variables.insert("source-param".to_string(), json!("super-secret-source"));
        let provider = StaticCredentialVariables::new(variables);

        let interpolated = provider.interpolate(&json!({"key": "((source-param))"})).await.unwrap();
        assert_eq!(interpolated, json!({"key": "super-secret-source"}));
    }

    #[tokio::test]
    async fn missing_placeholder_is_config_error() {
        let provider = StaticCredentialVariables::new(HashMap::new());
        let err = provider.interpolate(&json!("((missing))")).await.unwrap_err();
        assert_eq!(err.category(), "config");
    }

    #[tokio::test]
    async fn leaves_non_placeholder_strings_untouched() {
        let provider = StaticCredentialVariables::new(HashMap::new());
        let result = provider.interpolate(&json!({"uri": "https://example.com/app.git"})).await.unwrap();
        assert_eq!(result, json!({"uri": "https://example.com/app.git"}));
    }
}
