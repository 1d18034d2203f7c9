//! Build-finished ingestion and share refresh.

use std::sync::Arc;

use appship_core::{
    AppVersion, ArtifactInfo, ArtifactRecord, ArtifactSelector, EngineOutcome, SettingsError,
    ShareInfo,
};
use appship_provider::{fetch_all_artifacts, first_installable, ArtifactProvider};
use appship_state::{AppVersionRecord, AppVersionStore};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::{IngestError, Result};
use crate::settings::AppSettings;

/// A finished build reported by the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildEvent {
    pub app_slug: String,
    pub build_slug: String,
    pub build_number: String,
    pub commit_message: String,
    /// `None` when the provider did not say which workflow ran.
    pub triggered_workflow: Option<String>,
}

/// What ingesting one build did.
#[derive(Debug)]
pub enum IngestReport {
    /// The Android whitelist does not admit the triggering workflow.
    Skipped { workflow: Option<String> },
    /// The app must configure a module first; nothing was stored.
    NeedsConfiguration(SettingsError),
    /// One record per product flavour, in flavour order.
    Stored(Vec<AppVersionRecord>),
}

impl IngestReport {
    pub fn stored(&self) -> &[AppVersionRecord] {
        match self {
            IngestReport::Stored(records) => records,
            _ => &[],
        }
    }
}

/// Publish and share state of a stored version.
#[derive(Debug, Clone, Serialize)]
pub struct SharedVersion {
    pub record: AppVersionRecord,
    pub share: ShareInfo,
    /// Resolved URL of the public install page artifact, if there is one.
    pub public_install_page_url: Option<String>,
}

/// Ingest orchestrator.
pub struct BuildIngest;

impl BuildIngest {
    /// Turn a finished build into stored app versions.
    ///
    /// Steps: whitelist check, full artifact fetch, one descriptor per
    /// flavour, persist. A missing module setting is reported, not raised.
    /// A build without artifacts fails with [`IngestError::NoArtifacts`].
    pub async fn run(
        provider: Arc<dyn ArtifactProvider>,
        store: Arc<dyn AppVersionStore>,
        settings: &AppSettings,
        event: &BuildEvent,
    ) -> Result<IngestReport> {
        let span = info_span!(
            "appship.ingest",
            app_slug = %event.app_slug,
            build_slug = %event.build_slug
        );
        Self::run_inner(provider, store, settings, event)
            .instrument(span)
            .await
    }

    async fn run_inner(
        provider: Arc<dyn ArtifactProvider>,
        store: Arc<dyn AppVersionStore>,
        settings: &AppSettings,
        event: &BuildEvent,
    ) -> Result<IngestReport> {
        let workflow = event.triggered_workflow.as_deref();
        if !settings.android_admits(workflow) {
            info!(event = "ingest.skipped", workflow = ?workflow, "workflow not whitelisted");
            return Ok(IngestReport::Skipped {
                workflow: event.triggered_workflow.clone(),
            });
        }

        let artifacts =
            fetch_all_artifacts(provider.as_ref(), &event.app_slug, &event.build_slug).await?;
        if artifacts.is_empty() {
            warn!(event = "ingest.no_artifacts");
            return Err(IngestError::NoArtifacts {
                build_slug: event.build_slug.clone(),
            });
        }

        let outcome = ArtifactSelector::new(&artifacts).prepare_android_app_versions(
            &event.build_slug,
            &event.build_number,
            &event.commit_message,
            &settings.module,
        );
        let versions = match outcome {
            EngineOutcome::Ok(versions) => versions,
            EngineOutcome::ConfigurationError(e) => {
                warn!(event = "ingest.needs_configuration", error = %e);
                return Ok(IngestReport::NeedsConfiguration(e));
            }
            EngineOutcome::SystemError(e) => return Err(e.into()),
        };

        let mut stored = Vec::with_capacity(versions.len());
        for mut version in versions {
            fill_app_info(&mut version, &artifacts)?;
            stored.push(store.create(&event.app_slug, version).await?);
        }

        info!(
            event = "ingest.stored",
            artifacts = artifacts.len(),
            versions = stored.len()
        );
        Ok(IngestReport::Stored(stored))
    }

    /// Recompute publish and share state of a stored version against the
    /// build's current artifacts.
    pub async fn share_info(
        provider: Arc<dyn ArtifactProvider>,
        store: Arc<dyn AppVersionStore>,
        id: Uuid,
    ) -> Result<SharedVersion> {
        let record = store.get(id).await?;
        let app_slug = record.app_slug.as_str();
        let build_slug = record.version.build_slug.as_str();

        let artifacts = fetch_all_artifacts(provider.as_ref(), app_slug, build_slug).await?;
        let share = ArtifactSelector::new(&artifacts)
            .publish_and_share_info(&record.version)
            .into_result()?;

        let public_install_page_url = match share.public_install_page_artifact_slug.as_deref() {
            Some(slug) => Some(
                provider
                    .public_install_page_url(app_slug, build_slug, slug)
                    .await?,
            ),
            None => None,
        };

        Ok(SharedVersion {
            record,
            share,
            public_install_page_url,
        })
    }
}

/// Copy app facts from the flavour's first installable artifact, or its
/// first artifact when none is installable. Module and build type stay as
/// prepared.
fn fill_app_info(version: &mut AppVersion, artifacts: &[ArtifactRecord]) -> Result<()> {
    let mut info = version.artifact_info()?;
    let flavour: Vec<&ArtifactRecord> = artifacts
        .iter()
        .filter(|r| r.product_flavour() == version.product_flavour)
        .filter(|r| info.module.is_empty() || r.module() == info.module)
        .collect();
    let Some(source) = first_installable(flavour.iter().copied()).or(flavour.first().copied())
    else {
        return Ok(());
    };

    let app = ArtifactInfo::from_artifact(source);
    info.version = app.version;
    info.version_code = app.version_code;
    info.minimum_sdk = app.minimum_sdk;
    info.package_name = app.package_name;
    info.size = app.size;
    version.set_artifact_info(&info)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use appship_provider::MemoryArtifactProvider;
    use appship_state::MemoryAppVersionStore;
    use tracing_test::traced_test;

    fn event() -> BuildEvent {
        BuildEvent {
            app_slug: "app".to_string(),
            build_slug: "build".to_string(),
            triggered_workflow: Some("nightly".to_string()),
            ..Default::default()
        }
    }

    #[traced_test]
    #[tokio::test]
    async fn test_skip_is_logged() {
        let provider = Arc::new(MemoryArtifactProvider::default());
        let store = Arc::new(MemoryAppVersionStore::new());
        let settings = AppSettings {
            android_workflow: "primary".to_string(),
            ..Default::default()
        };

        let report = BuildIngest::run(provider, store, &settings, &event())
            .await
            .unwrap();
        assert!(matches!(report, IngestReport::Skipped { .. }));
        assert!(logs_contain("ingest.skipped"));
    }

    #[traced_test]
    #[tokio::test]
    async fn test_needs_configuration_is_logged() {
        let provider = Arc::new(MemoryArtifactProvider::default());
        let records = ["app", "lib"]
            .iter()
            .map(|module| appship_core::ArtifactRecord {
                meta: Some(appship_core::ArtifactMeta {
                    module: module.to_string(),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .collect();
        provider.insert_build("app", "build", records);
        let store = Arc::new(MemoryAppVersionStore::new());
        let settings = AppSettings {
            android_workflow: "all".to_string(),
            ..Default::default()
        };

        let report = BuildIngest::run(provider, store, &settings, &event())
            .await
            .unwrap();
        assert!(matches!(report, IngestReport::NeedsConfiguration(_)));
        assert!(logs_contain("ingest.needs_configuration"));
        assert!(logs_contain("No module setting found"));
    }

    #[traced_test]
    #[tokio::test]
    async fn test_empty_build_is_logged() {
        let provider = Arc::new(MemoryArtifactProvider::default());
        provider.insert_build("app", "build", Vec::new());
        let store = Arc::new(MemoryAppVersionStore::new());
        let settings = AppSettings {
            android_workflow: "all".to_string(),
            ..Default::default()
        };

        let err = BuildIngest::run(provider, store, &settings, &event())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::NoArtifacts { .. }));
        assert!(logs_contain("ingest.no_artifacts"));
    }
}
