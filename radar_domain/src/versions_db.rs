// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # VersionsDB Projection
//!
//! The pure selection rules from §4.2. This module takes already
//! pipeline-scoped candidate rows (the join against "which resource/job
//! belongs to this pipeline" is `radar-engine`'s job, since it needs the
//! repository) and applies the domain-level filtering and implicit-output
//! derivation. Caching/memoization on top of this projection (the
//! reference-identity "same snapshot" behavior from §9) is an application
//! concern layered in `radar-engine`'s `VersionsDbService`.

use crate::entities::BuildStatus;
use crate::value_objects::{BuildId, CheckOrder, JobId, PipelineId, ResourceId, ResourceVersionId};
use std::collections::{HashMap, HashSet};

/// A resource version, already resolved to the owning resource, before
/// the check_order/disabled filter is applied.
#[derive(Debug, Clone)]
pub struct CandidateVersion {
    pub version_id: ResourceVersionId,
    pub resource_id: ResourceId,
    pub check_order: CheckOrder,
    pub disabled: bool,
}

#[derive(Debug, Clone)]
pub struct CandidateInput {
    pub version_id: ResourceVersionId,
    pub job_id: JobId,
    pub build_id: BuildId,
    pub input_name: String,
    pub build_status: BuildStatus,
}

#[derive(Debug, Clone)]
pub struct CandidateOutput {
    pub version_id: ResourceVersionId,
    pub job_id: JobId,
    pub build_id: BuildId,
    pub build_status: BuildStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceVersionEntry {
    pub version_id: ResourceVersionId,
    pub resource_id: ResourceId,
    pub check_order: CheckOrder,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildInputEntry {
    pub version_id: ResourceVersionId,
    pub job_id: JobId,
    pub build_id: BuildId,
    pub input_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildOutputEntry {
    pub version_id: ResourceVersionId,
    pub job_id: JobId,
    pub build_id: BuildId,
    pub implicit: bool,
}

/// The in-memory projection returned by `LoadVersionsDB()` (§4.2).
#[derive(Debug, Clone)]
pub struct VersionsDb {
    resource_versions: HashSet<ResourceVersionEntry>,
    build_inputs: Vec<BuildInputEntry>,
    build_outputs: Vec<BuildOutputEntry>,
    resource_ids: HashMap<String, ResourceId>,
    job_ids: HashMap<String, JobId>,
    pipeline_id: PipelineId,
}

impl VersionsDb {
    pub fn project(
        pipeline_id: PipelineId,
        resource_ids: HashMap<String, ResourceId>,
        job_ids: HashMap<String, JobId>,
        versions: &[CandidateVersion],
        inputs: &[CandidateInput],
        outputs: &[CandidateOutput],
    ) -> Self {
        // Invariant 1 (§3/§8): check_order = 0 and disabled versions are excluded.
        let resource_versions: HashSet<ResourceVersionEntry> = versions
            .iter()
            .filter(|v| !v.check_order.is_unchecked() && !v.disabled)
            .map(|v| ResourceVersionEntry {
                version_id: v.version_id.clone(),
                resource_id: v.resource_id.clone(),
                check_order: v.check_order,
            })
            .collect();
        let selected: HashSet<&ResourceVersionId> = resource_versions.iter().map(|v| &v.version_id).collect();

        let build_inputs: Vec<BuildInputEntry> = inputs
            .iter()
            .filter(|i| selected.contains(&i.version_id))
            .map(|i| BuildInputEntry {
                version_id: i.version_id.clone(),
                job_id: i.job_id.clone(),
                build_id: i.build_id.clone(),
                input_name: i.input_name.clone(),
            })
            .collect();

        let mut build_outputs: Vec<BuildOutputEntry> = outputs
            .iter()
            .filter(|o| o.build_status == BuildStatus::Succeeded && selected.contains(&o.version_id))
            .map(|o| BuildOutputEntry {
                version_id: o.version_id.clone(),
                job_id: o.job_id.clone(),
                build_id: o.build_id.clone(),
                implicit: false,
            })
            .collect();

        // Implicit outputs: every enabled input of a successful build (§4.2, §9).
        let implicit_outputs = inputs
            .iter()
            .filter(|i| i.build_status == BuildStatus::Succeeded && selected.contains(&i.version_id))
            .map(|i| BuildOutputEntry {
                version_id: i.version_id.clone(),
                job_id: i.job_id.clone(),
                build_id: i.build_id.clone(),
                implicit: true,
            });
        build_outputs.extend(implicit_outputs);

        Self {
            resource_versions,
            build_inputs,
            build_outputs,
            resource_ids,
            job_ids,
            pipeline_id,
        }
    }

    pub fn pipeline_id(&self) -> &PipelineId {
        &self.pipeline_id
    }

    pub fn resource_versions(&self) -> &HashSet<ResourceVersionEntry> {
        &self.resource_versions
    }

    pub fn build_inputs(&self) -> &[BuildInputEntry] {
        &self.build_inputs
    }

    pub fn build_outputs(&self) -> &[BuildOutputEntry] {
        &self.build_outputs
    }

    pub fn resource_id(&self, name: &str) -> Option<&ResourceId> {
        self.resource_ids.get(name)
    }

    pub fn job_id(&self, name: &str) -> Option<&JobId> {
        self.job_ids.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (ResourceId, JobId, BuildId, ResourceVersionId, ResourceVersionId) {
        (ResourceId::new(), JobId::new(), BuildId::new(), ResourceVersionId::new(), ResourceVersionId::new())
    }

    #[test]
    fn excludes_unchecked_and_disabled_versions() {
        let (resource_id, _, _, v1, v2) = ids();
        let versions = vec![
            CandidateVersion {
                version_id: v1.clone(),
                resource_id: resource_id.clone(),
                check_order: CheckOrder::new(1),
                disabled: false,
            },
            CandidateVersion {
                version_id: v2,
                resource_id: resource_id.clone(),
                check_order: CheckOrder::UNCHECKED,
                disabled: false,
            },
        ];
        let db = VersionsDb::project(PipelineId::new(), HashMap::new(), HashMap::new(), &versions, &[], &[]);
        assert_eq!(db.resource_versions().len(), 1);
        assert!(db.resource_versions().iter().any(|v| v.version_id == v1));
    }

    #[test]
    fn disabled_version_excluded_even_with_nonzero_check_order() {
        let (resource_id, _, _, v1, _) = ids();
        let versions = vec![CandidateVersion {
            version_id: v1,
            resource_id,
            check_order: CheckOrder::new(5),
            disabled: true,
        }];
        let db = VersionsDb::project(PipelineId::new(), HashMap::new(), HashMap::new(), &versions, &[], &[]);
        assert!(db.resource_versions().is_empty());
    }

    #[test]
    fn implicit_output_derived_from_successful_build_input() {
        let (resource_id, job_id, build_id, v1, _) = ids();
        let versions = vec![CandidateVersion {
            version_id: v1.clone(),
            resource_id,
            check_order: CheckOrder::new(1),
            disabled: false,
        }];
        let inputs = vec![CandidateInput {
            version_id: v1.clone(),
            job_id: job_id.clone(),
            build_id: build_id.clone(),
            input_name: "app-repo".into(),
            build_status: BuildStatus::Succeeded,
        }];
        let db = VersionsDb::project(PipelineId::new(), HashMap::new(), HashMap::new(), &versions, &inputs, &[]);
        assert!(db
            .build_outputs()
            .iter()
            .any(|o| o.implicit && o.build_id == build_id && o.version_id == v1));
    }

    #[test]
    fn no_implicit_output_for_unsuccessful_build() {
        let (resource_id, job_id, build_id, v1, _) = ids();
        let versions = vec![CandidateVersion {
            version_id: v1.clone(),
            resource_id,
            check_order: CheckOrder::new(1),
            disabled: false,
        }];
        let inputs = vec![CandidateInput {
            version_id: v1,
            job_id,
            build_id,
            input_name: "app-repo".into(),
            build_status: BuildStatus::Failed,
        }];
        let db = VersionsDb::project(PipelineId::new(), HashMap::new(), HashMap::new(), &versions, &inputs, &[]);
        assert!(db.build_outputs().is_empty());
    }

    #[test]
    fn projection_is_idempotent_for_identical_inputs() {
        let (resource_id, _, _, v1, _) = ids();
        let versions = vec![CandidateVersion {
            version_id: v1,
            resource_id,
            check_order: CheckOrder::new(1),
            disabled: false,
        }];
        let a = VersionsDb::project(PipelineId::new(), HashMap::new(), HashMap::new(), &versions, &[], &[]);
        let b = VersionsDb::project(PipelineId::new(), HashMap::new(), HashMap::new(), &versions, &[], &[]);
        assert_eq!(a.resource_versions(), b.resource_versions());
    }
}
