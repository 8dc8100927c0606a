// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `CheckOrder` - the monotonic ordinal a check assigns to a version it
//! observes within one `(resource_config_id, space)`.
//!
//! `0` is reserved: it marks a placeholder `ResourceVersion` row created by
//! `SaveUncheckedVersion` (a build referenced a version no check has seen
//! yet). Placeholder rows never appear in the VersionsDB projection.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct CheckOrder(u64);

impl CheckOrder {
    /// Placeholder order for a version saved by build I/O, not yet checked.
    pub const UNCHECKED: CheckOrder = CheckOrder(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub fn is_unchecked(self) -> bool {
        self.0 == 0
    }

    /// The next order in sequence. Checks call this to assign an order that
    /// is strictly greater than every prior order within the same
    /// `(resource_config_id, space)`.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Default for CheckOrder {
    fn default() -> Self {
        Self::UNCHECKED
    }
}

impl fmt::Display for CheckOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchecked_is_zero() {
        assert!(CheckOrder::UNCHECKED.is_unchecked());
        assert_eq!(CheckOrder::default(), CheckOrder::UNCHECKED);
    }

    #[test]
    fn next_is_strictly_greater() {
        let first = CheckOrder::UNCHECKED.next();
        let second = first.next();
        assert!(second > first);
        assert!(first > CheckOrder::UNCHECKED);
    }

    #[test]
    fn nonzero_is_not_unchecked() {
        assert!(!CheckOrder::new(1).is_unchecked());
    }
}
