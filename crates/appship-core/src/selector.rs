//! Release selection over one build's artifact listing.
//!
//! [`ArtifactSelector`] borrows a single snapshot of the listing so that
//! [`ArtifactSelector::select`] and [`ArtifactSelector::publish_and_share_info`]
//! always agree on the grouping.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::app_version::{AppVersion, ArtifactInfo, Platform};
use crate::artifact::{ArtifactRecord, DEBUG_BUILD_TYPE, RELEASE_BUILD_TYPE};
use crate::grouping::{flavours, group_into_bundles, require_module_if_ambiguous};
use crate::obs;
use crate::outcome::EngineOutcome;

/// Publish and share state of a stored app version.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShareInfo {
    /// False only when the stored build type is exactly `debug`.
    pub publish_enabled: bool,
    pub public_install_page_enabled: bool,
    /// Install target whose public install page is enabled.
    pub public_install_page_artifact_slug: Option<String>,
    pub split: bool,
    pub universal_available: bool,
}

/// Selection engine over a borrowed artifact listing.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactSelector<'a> {
    artifacts: &'a [ArtifactRecord],
}

impl<'a> ArtifactSelector<'a> {
    pub fn new(artifacts: &'a [ArtifactRecord]) -> Self {
        Self { artifacts }
    }

    /// Slugs of the files that make up the release deliverables.
    ///
    /// Only `release` artifacts are considered. A non-empty `module_name`
    /// restricts the selection to that module; it is required when the
    /// release artifacts span several modules.
    pub fn select(&self, module_name: &str) -> EngineOutcome<Vec<String>> {
        let releases: Vec<&ArtifactRecord> = self
            .artifacts
            .iter()
            .filter(|r| r.build_type() == RELEASE_BUILD_TYPE)
            .collect();

        if let Err(e) = require_module_if_ambiguous(releases.iter().copied(), module_name) {
            obs::emit_module_ambiguous("select", releases.len());
            return EngineOutcome::ConfigurationError(e);
        }

        let scoped = releases
            .into_iter()
            .filter(|r| module_name.is_empty() || r.module() == module_name);
        let bundles = group_into_bundles(scoped);
        let slugs: Vec<String> = bundles
            .iter()
            .flat_map(|bundle| bundle.deliverables().map(|r| r.slug.clone()))
            .collect();

        obs::emit_selection_completed(module_name, bundles.len(), slugs.len());
        EngineOutcome::Ok(slugs)
    }

    /// One Android app version per product flavour, in first-occurrence
    /// order.
    ///
    /// Each version's artifact info carries `module_setting` and the
    /// flavour's build types, deduplicated, sorted and joined with `", "`.
    pub fn prepare_android_app_versions(
        &self,
        build_slug: &str,
        build_number: &str,
        commit_message: &str,
        module_setting: &str,
    ) -> EngineOutcome<Vec<AppVersion>> {
        let ordered = flavours(self.artifacts);

        if let Err(e) = require_module_if_ambiguous(self.artifacts, module_setting) {
            obs::emit_module_ambiguous("prepare_android_app_versions", self.artifacts.len());
            return EngineOutcome::ConfigurationError(e);
        }

        let mut versions = Vec::with_capacity(ordered.len());
        for flavour in ordered {
            let info = ArtifactInfo {
                module: module_setting.to_string(),
                build_type: aggregate_build_type(self.artifacts, flavour),
                ..Default::default()
            };
            match AppVersion::new(
                Platform::Android,
                build_slug,
                build_number,
                commit_message,
                flavour,
                &info,
            ) {
                Ok(version) => versions.push(version),
                Err(e) => return EngineOutcome::SystemError(e),
            }
        }

        obs::emit_versions_prepared(build_slug, versions.len());
        EngineOutcome::Ok(versions)
    }

    /// Recompute publish eligibility and install-page state for a stored
    /// app version against this listing.
    pub fn publish_and_share_info(&self, version: &AppVersion) -> EngineOutcome<ShareInfo> {
        let info = match version.artifact_info() {
            Ok(info) => info,
            Err(e) => return EngineOutcome::SystemError(e),
        };

        let mut share = ShareInfo {
            publish_enabled: info.build_type != DEBUG_BUILD_TYPE,
            ..Default::default()
        };
        if self.artifacts.is_empty() {
            return EngineOutcome::Ok(share);
        }

        let flavour_records: Vec<&ArtifactRecord> = self
            .artifacts
            .iter()
            .filter(|r| r.product_flavour() == version.product_flavour)
            .collect();
        if let Err(e) = require_module_if_ambiguous(flavour_records.iter().copied(), &info.module) {
            obs::emit_module_ambiguous("publish_and_share_info", flavour_records.len());
            return EngineOutcome::ConfigurationError(e);
        }

        let bundles = group_into_bundles(
            flavour_records
                .into_iter()
                .filter(|r| info.module.is_empty() || r.module() == info.module),
        );

        share.split = bundles.iter().any(|b| b.is_split());
        share.universal_available = bundles.iter().any(|b| b.universal_path().is_some());
        // Release install targets shadow debug ones, matching what `select` ships.
        let targets: Vec<&ArtifactRecord> =
            bundles.iter().flat_map(|b| b.install_targets()).collect();
        let release_only = targets.iter().any(|r| r.build_type() == RELEASE_BUILD_TYPE);
        share.public_install_page_artifact_slug = targets
            .into_iter()
            .filter(|r| !release_only || r.build_type() == RELEASE_BUILD_TYPE)
            .find(|r| r.is_public_page_enabled)
            .map(|r| r.slug.clone());
        share.public_install_page_enabled = share.public_install_page_artifact_slug.is_some();

        obs::emit_share_evaluated(&version.product_flavour, &share);
        EngineOutcome::Ok(share)
    }
}

/// Non-empty build types of `flavour`, deduplicated, sorted and joined.
fn aggregate_build_type(artifacts: &[ArtifactRecord], flavour: &str) -> String {
    artifacts
        .iter()
        .filter(|r| r.product_flavour() == flavour)
        .map(|r| r.build_type())
        .filter(|t| !t.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(", ")
}
