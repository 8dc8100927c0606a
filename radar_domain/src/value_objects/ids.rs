// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Entity Identifiers
//!
//! All entity IDs in this domain are ULID-backed: time-ordered, globally
//! unique, and sortable by creation time. `GenericId<T>` is the shared
//! implementation; each entity gets its own phantom-typed newtype so a
//! `BuildId` can never be handed to a function expecting a `JobId`.

use crate::error::RadarError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;
use ulid::Ulid;

/// Per-category validation hook for `GenericId<T>`.
pub trait IdCategory {
    fn category_name() -> &'static str;

    fn validate_id(ulid: &Ulid) -> Result<(), RadarError> {
        if *ulid == Ulid::nil() {
            return Err(RadarError::ValidationError(format!("{} id cannot be nil", Self::category_name())));
        }
        Ok(())
    }

    fn allows_nil() -> bool {
        false
    }
}

/// Generic ULID-backed identifier. Entity ID newtypes wrap this rather than
/// duplicating the ULID plumbing.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct GenericId<T: IdCategory> {
    value: Ulid,
    _phantom: PhantomData<T>,
}

impl<T: IdCategory> Serialize for GenericId<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.value.to_string().serialize(serializer)
    }
}

impl<'de, T: IdCategory> Deserialize<'de> for GenericId<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let ulid = Ulid::from_string(&s).map_err(|e| serde::de::Error::custom(e.to_string()))?;
        Ok(Self {
            value: ulid,
            _phantom: PhantomData,
        })
    }
}

impl<T: IdCategory> GenericId<T> {
    /// Generates a fresh, time-ordered id.
    pub fn new() -> Self {
        Self {
            value: Ulid::new(),
            _phantom: PhantomData,
        }
    }

    pub fn from_ulid(ulid: Ulid) -> Result<Self, RadarError> {
        T::validate_id(&ulid)?;
        Ok(Self {
            value: ulid,
            _phantom: PhantomData,
        })
    }

    /// Builds a boundary id for a given timestamp, useful for range queries.
    pub fn from_timestamp_ms(timestamp_ms: u64) -> Result<Self, RadarError> {
        let random = rand::random::<u128>() & ((1u128 << 80) - 1);
        let ulid = Ulid::from_parts(timestamp_ms, random);
        T::validate_id(&ulid)?;
        Ok(Self {
            value: ulid,
            _phantom: PhantomData,
        })
    }

    pub fn from_string(s: &str) -> Result<Self, RadarError> {
        let ulid = Ulid::from_str(s).map_err(|e| RadarError::ValidationError(format!("invalid id format: {}", e)))?;
        Self::from_ulid(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.value
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.value.timestamp_ms()
    }

    pub fn datetime(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp_millis(self.timestamp_ms() as i64).unwrap_or_else(chrono::Utc::now)
    }

    pub fn category(&self) -> &'static str {
        T::category_name()
    }

    pub fn validate(&self) -> Result<(), RadarError> {
        T::validate_id(&self.value)
    }

    pub fn is_nil(&self) -> bool {
        self.value.0 == 0
    }

    #[cfg(test)]
    pub fn nil() -> Self {
        Self {
            value: Ulid(0),
            _phantom: PhantomData,
        }
    }
}

impl<T: IdCategory> Default for GenericId<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: IdCategory> Display for GenericId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T: IdCategory> Hash for GenericId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T: IdCategory> FromStr for GenericId<T> {
    type Err = RadarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl<T: IdCategory> From<GenericId<T>> for Ulid {
    fn from(id: GenericId<T>) -> Self {
        id.value
    }
}

impl<T: IdCategory> AsRef<Ulid> for GenericId<T> {
    fn as_ref(&self) -> &Ulid {
        &self.value
    }
}

/// Defines a phantom marker + newtype pair wrapping `GenericId`, identically
/// to how `pipeline_id.rs` defines `PipelineId` over `PipelineMarker`.
macro_rules! define_id {
    ($marker:ident, $id:ident, $category:literal) => {
        #[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
        pub struct $marker;

        impl IdCategory for $marker {
            fn category_name() -> &'static str {
                $category
            }
        }

        #[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
        pub struct $id(GenericId<$marker>);

        impl $id {
            pub fn new() -> Self {
                Self(GenericId::new())
            }

            pub fn from_ulid(ulid: Ulid) -> Result<Self, RadarError> {
                GenericId::from_ulid(ulid).map(Self)
            }

            pub fn from_string(s: &str) -> Result<Self, RadarError> {
                GenericId::from_string(s).map(Self)
            }

            pub fn as_ulid(&self) -> Ulid {
                self.0.as_ulid()
            }

            pub fn timestamp_ms(&self) -> u64 {
                self.0.timestamp_ms()
            }

            pub fn datetime(&self) -> chrono::DateTime<chrono::Utc> {
                self.0.datetime()
            }
        }

        impl Default for $id {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $id {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $id {
            type Err = RadarError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_string(s)
            }
        }
    };
}

define_id!(PipelineMarker, PipelineId, "pipeline");
define_id!(ResourceMarker, ResourceId, "resource");
define_id!(ResourceTypeMarker, ResourceTypeId, "resource_type");
define_id!(JobMarker, JobId, "job");
define_id!(BuildMarker, BuildId, "build");
define_id!(ResourceConfigMarker, ResourceConfigId, "resource_config");
define_id!(ResourceCacheMarker, ResourceCacheId, "resource_cache");
define_id!(ResourceVersionMarker, ResourceVersionId, "resource_version");

/// Batch helpers mirroring `generic_id_utils`, used by migration/backfill code.
pub mod id_utils {
    use super::*;

    pub fn validate_batch<T: IdCategory>(ids: &[GenericId<T>]) -> Result<(), RadarError> {
        for id in ids {
            id.validate()?;
        }
        Ok(())
    }

    pub fn sort_by_time<T: IdCategory + Ord>(mut ids: Vec<GenericId<T>>) -> Vec<GenericId<T>> {
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types_but_share_ulid_backing() {
        let build = BuildId::new();
        let job = JobId::new();
        assert_ne!(build.to_string(), job.to_string());
    }

    #[test]
    fn round_trips_through_string() {
        let id = ResourceId::new();
        let parsed = ResourceId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn nil_ulid_is_rejected_by_default_category_validation() {
        let err = PipelineId::from_ulid(Ulid::nil());
        assert!(err.is_err());
    }

    #[test]
    fn serializes_as_bare_string_not_json_object() {
        let id = JobId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }

    #[test]
    fn ids_sort_chronologically() {
        let a = GenericId::<PipelineMarker>::from_timestamp_ms(1_000).unwrap();
        let b = GenericId::<PipelineMarker>::from_timestamp_ms(2_000).unwrap();
        let sorted = id_utils::sort_by_time(vec![b.clone(), a.clone()]);
        assert_eq!(sorted, vec![a, b]);
    }

    #[test]
    fn category_name_matches_entity() {
        assert_eq!(BuildId::new().0.category(), "build");
        assert_eq!(ResourceVersionId::new().0.category(), "resource_version");
    }
}
