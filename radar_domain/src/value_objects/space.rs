// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `Space` - the driver-defined partition of a resource's version stream
//! (e.g. a branch name). Most resource types have exactly one space, the
//! default space, but multi-branch or multi-tag drivers report several.

use crate::error::RadarError;
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_LEN: usize = 512;

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Space(String);

impl Space {
    /// The implicit space used by drivers that don't partition their stream.
    pub fn default_space() -> Self {
        Self(String::new())
    }

    pub fn new(value: impl Into<String>) -> Result<Self, RadarError> {
        let value = value.into();
        if value.len() > MAX_LEN {
            return Err(RadarError::ValidationError(format!("space exceeds {} characters", MAX_LEN)));
        }
        if value.contains('\0') {
            return Err(RadarError::ValidationError("space must not contain a null byte".into()));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for Space {
    fn default() -> Self {
        Self::default_space()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_space_is_empty_and_is_default() {
        let space = Space::default_space();
        assert!(space.is_default());
        assert_eq!(space.as_str(), "");
    }

    #[test]
    fn named_space_round_trips() {
        let space = Space::new("main").unwrap();
        assert_eq!(space.as_str(), "main");
        assert!(!space.is_default());
    }

    #[test]
    fn rejects_oversized_space() {
        let too_long = "a".repeat(MAX_LEN + 1);
        assert!(Space::new(too_long).is_err());
    }
}
