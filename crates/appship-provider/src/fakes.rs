//! In-memory provider (testing and offline use)

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use appship_core::ArtifactRecord;
use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::provider::{ArtifactPage, ArtifactProvider, Paging};

#[derive(Debug, Default)]
struct Builds {
    artifacts: HashMap<(String, String), Vec<ArtifactRecord>>,
    install_pages: HashMap<String, String>,
    list_calls: usize,
}

/// Serves registered builds in pages of `page_size`, using the offset of the
/// next page as cursor.
#[derive(Debug)]
pub struct MemoryArtifactProvider {
    page_size: usize,
    builds: Mutex<Builds>,
}

impl Default for MemoryArtifactProvider {
    fn default() -> Self {
        Self::new(50)
    }
}

impl MemoryArtifactProvider {
    pub fn new(page_size: usize) -> Self {
        MemoryArtifactProvider {
            page_size: page_size.max(1),
            builds: Mutex::new(Builds::default()),
        }
    }

    fn builds(&self) -> MutexGuard<'_, Builds> {
        self.builds.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register (or replace) the listing of one build.
    pub fn insert_build(&self, app_slug: &str, build_slug: &str, artifacts: Vec<ArtifactRecord>) {
        self.builds()
            .artifacts
            .insert((app_slug.to_string(), build_slug.to_string()), artifacts);
    }

    pub fn set_install_page(&self, artifact_slug: &str, url: &str) {
        self.builds()
            .install_pages
            .insert(artifact_slug.to_string(), url.to_string());
    }

    /// Number of `list_artifacts` calls served so far.
    pub fn list_calls(&self) -> usize {
        self.builds().list_calls
    }
}

#[async_trait]
impl ArtifactProvider for MemoryArtifactProvider {
    async fn list_artifacts(
        &self,
        app_slug: &str,
        build_slug: &str,
        next: Option<&str>,
    ) -> Result<ArtifactPage> {
        let mut builds = self.builds();
        builds.list_calls += 1;
        let artifacts = builds
            .artifacts
            .get(&(app_slug.to_string(), build_slug.to_string()))
            .ok_or_else(|| ProviderError::NotFound(format!("{app_slug}/{build_slug}")))?;

        let offset = match next {
            Some(cursor) => cursor
                .parse::<usize>()
                .map_err(|_| ProviderError::NotFound(format!("cursor {cursor}")))?,
            None => 0,
        };
        let end = (offset + self.page_size).min(artifacts.len());
        let data = artifacts.get(offset..end).unwrap_or_default().to_vec();

        Ok(ArtifactPage {
            data,
            paging: Paging {
                total_item_count: artifacts.len() as u64,
                page_item_limit: self.page_size as u64,
                next: (end < artifacts.len()).then(|| end.to_string()),
            },
        })
    }

    async fn public_install_page_url(
        &self,
        _app_slug: &str,
        _build_slug: &str,
        artifact_slug: &str,
    ) -> Result<String> {
        self.builds()
            .install_pages
            .get(artifact_slug)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(artifact_slug.to_string()))
    }
}
