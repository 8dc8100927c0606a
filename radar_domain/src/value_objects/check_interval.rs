// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `CheckInterval` - how often Radar re-checks a resource. A Resource may
//! override the pipeline/process default via its own `check_every` string
//! (e.g. `"1m"`, `"10s"`).
//!
//! The parse error message is a literal byte-for-byte match with the
//! upstream scanner's error text, not `humantime`'s own `Display` output -
//! downstream log scraping and tests key off this exact string.

use crate::error::RadarError;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CheckInterval(Duration);

impl CheckInterval {
    pub fn from_duration(duration: Duration) -> Self {
        Self(duration)
    }

    pub fn as_duration(self) -> Duration {
        self.0
    }

    /// Parses a `check_every` string such as `"1m"` or `"30s"`.
    ///
    /// On failure, returns `RadarError::ConfigError` with the literal
    /// message `"time: invalid duration {value}"`.
    pub fn parse(value: &str) -> Result<Self, RadarError> {
        humantime::parse_duration(value)
            .map(Self)
            .map_err(|_| RadarError::ConfigError(format!("time: invalid duration {}", value)))
    }

    /// Resolves the effective interval: the resource's own `check_every` if
    /// present and parseable, else the configured default.
    pub fn resolve(check_every: Option<&str>, default: CheckInterval) -> Result<Self, RadarError> {
        match check_every {
            Some(value) => Self::parse(value),
            None => Ok(default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_duration() {
        let interval = CheckInterval::parse("1m").unwrap();
        assert_eq!(interval.as_duration(), Duration::from_secs(60));
    }

    #[test]
    fn invalid_duration_produces_literal_error_string() {
        let err = CheckInterval::parse("bad-value").unwrap_err();
        assert_eq!(err.message(), "time: invalid duration bad-value");
    }

    #[test]
    fn resolve_falls_back_to_default_when_unset() {
        let default = CheckInterval::from_duration(Duration::from_secs(60));
        let resolved = CheckInterval::resolve(None, default).unwrap();
        assert_eq!(resolved, default);
    }

    #[test]
    fn resolve_prefers_resource_override() {
        let default = CheckInterval::from_duration(Duration::from_secs(60));
        let resolved = CheckInterval::resolve(Some("10s"), default).unwrap();
        assert_eq!(resolved.as_duration(), Duration::from_secs(10));
    }

    #[test]
    fn resolve_propagates_parse_error() {
        let default = CheckInterval::from_duration(Duration::from_secs(60));
        assert!(CheckInterval::resolve(Some("bad-value"), default).is_err());
    }
}
