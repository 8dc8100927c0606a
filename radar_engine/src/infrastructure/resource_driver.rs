// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Process-spawning [`ResourceDriver`].
//!
//! The wire protocol between this engine and a resource's `check`/`in`/`out`
//! scripts is deliberately unspecified by the domain (§6 Non-goals); this
//! adapter picks one concrete shape - a single executable named by
//! `source.driver_command`, fed a JSON request object on stdin, emitting a
//! JSON response object (or, for `check`, newline-delimited JSON objects) on
//! stdout - and is the only place in the crate that knows it.

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use radar_domain::{DiscoveredVersion, FetchOutcome, PutOutcome, RadarError, ResourceDriver};
use serde_json::Value;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;

pub struct ProcessResourceDriver;

impl ProcessResourceDriver {
    pub fn new() -> Self {
        Self
    }

    fn command_for(source: &Value) -> Result<String, RadarError> {
        source
            .get("driver_command")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| RadarError::config("source is missing \"driver_command\""))
    }

    async fn run(command: &str, verb: &str, request: &Value) -> Result<(Vec<u8>, bool), RadarError> {
        let mut child = Command::new(command)
            .arg(verb)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RadarError::driver_failure(format!("spawning {command} {verb}: {e}")))?;

        let payload = serde_json::to_vec(request)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&payload)
                .await
                .map_err(|e| RadarError::driver_failure(format!("writing to {command} {verb}: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| RadarError::driver_failure(format!("waiting for {command} {verb}: {e}")))?;

        Ok((output.stdout, output.status.success()))
    }
}

impl Default for ProcessResourceDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceDriver for ProcessResourceDriver {
    async fn check(
        &self,
        source: &Value,
        current_versions_by_space: &[(String, Value)],
    ) -> Result<BoxStream<'static, Result<DiscoveredVersion, RadarError>>, RadarError> {
        let command = Self::command_for(source)?;
        let request = serde_json::json!({
            "source": source,
            "versions": current_versions_by_space
                .iter()
                .map(|(space, version)| serde_json::json!({"space": space, "version": version}))
                .collect::<Vec<_>>(),
        });

        let mut child = Command::new(&command)
            .arg("check")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| RadarError::driver_failure(format!("spawning {command} check: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            let payload = serde_json::to_vec(&request)?;
            stdin
                .write_all(&payload)
                .await
                .map_err(|e| RadarError::driver_failure(format!("writing to {command} check: {e}")))?;
        }

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RadarError::driver_failure(format!("{command} check produced no stdout")))?;
        let mut lines = BufReader::new(stdout).lines();

        let mut discovered = Vec::new();
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| RadarError::driver_failure(format!("reading {command} check output: {e}")))?
        {
            if line.trim().is_empty() {
                continue;
            }
            let parsed: Value = serde_json::from_str(&line)?;
            discovered.push(Ok(DiscoveredVersion {
                space: parsed.get("space").and_then(Value::as_str).unwrap_or("").to_string(),
                version: parsed.get("version").cloned().unwrap_or(Value::Null),
                metadata: parsed.get("metadata").cloned().unwrap_or(Value::Null),
            }));
        }

        let status = child
            .wait()
            .await
            .map_err(|e| RadarError::driver_failure(format!("waiting for {command} check: {e}")))?;
        if !status.success() {
            return Err(RadarError::driver_failure(format!("{command} check exited with {status}")));
        }

        Ok(stream::iter(discovered).boxed())
    }

    async fn fetch(&self, source: &Value, space: &str, version: &Value, params: &Value) -> Result<FetchOutcome, RadarError> {
        let command = Self::command_for(source)?;
        let dest_dir = tempfile::tempdir().map_err(|e| RadarError::IoError(e.to_string()))?;
        let request = serde_json::json!({
            "source": source,
            "space": space,
            "version": version,
            "params": params,
            "dest_dir": dest_dir.path(),
        });
        let (stdout, success) = Self::run(&command, "in", &request).await?;
        let parsed: Value = if stdout.is_empty() { Value::Null } else { serde_json::from_slice(&stdout)? };

        let volume_path = if success {
            Some(crate::infrastructure::artifact::ArtifactSource::from_directory(dest_dir.path())?.into_archive_path())
        } else {
            None
        };

        Ok(FetchOutcome {
            metadata: parsed.get("metadata").cloned().unwrap_or(Value::Null),
            exit_status: if success { 0 } else { 1 },
            volume_path,
        })
    }

    async fn put(&self, source: &Value, params: &Value) -> Result<PutOutcome, RadarError> {
        let command = Self::command_for(source)?;
        let request = serde_json::json!({"source": source, "params": params});
        let (stdout, success) = Self::run(&command, "out", &request).await?;
        let parsed: Value = if stdout.is_empty() { Value::Null } else { serde_json::from_slice(&stdout)? };

        let versions = parsed
            .get("versions")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| DiscoveredVersion {
                        space: entry.get("space").and_then(Value::as_str).unwrap_or("").to_string(),
                        version: entry.get("version").cloned().unwrap_or(Value::Null),
                        metadata: entry.get("metadata").cloned().unwrap_or(Value::Null),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(PutOutcome {
            versions,
            metadata: parsed.get("metadata").cloned().unwrap_or(Value::Null),
            exit_status: if success { 0 } else { 1 },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn fetch_rejects_source_without_driver_command() {
        let driver = ProcessResourceDriver::new();
        let err = driver.fetch(&json!({}), "", &json!({}), &json!({})).await.unwrap_err();
        assert_eq!(err.category(), "config");
    }
}
