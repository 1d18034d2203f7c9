//! The artifact listing seam and cursor pagination over it.

use std::collections::HashSet;

use appship_core::ArtifactRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProviderError, Result};

/// Paging block of a listing response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Paging {
    pub total_item_count: u64,
    pub page_item_limit: u64,
    /// Cursor of the next page; absent or empty on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// One page of a build's artifact listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArtifactPage {
    pub data: Vec<ArtifactRecord>,
    pub paging: Paging,
}

impl ArtifactPage {
    /// Cursor to continue from, if any.
    pub fn next_cursor(&self) -> Option<&str> {
        self.paging.next.as_deref().filter(|n| !n.is_empty())
    }
}

/// Read access to the build provider's artifacts.
#[async_trait]
pub trait ArtifactProvider: Send + Sync {
    /// One page of the build's artifacts; `next` is the cursor returned by
    /// the previous page.
    async fn list_artifacts(
        &self,
        app_slug: &str,
        build_slug: &str,
        next: Option<&str>,
    ) -> Result<ArtifactPage>;

    /// Public install page URL of one artifact.
    async fn public_install_page_url(
        &self,
        app_slug: &str,
        build_slug: &str,
        artifact_slug: &str,
    ) -> Result<String>;
}

/// Every artifact of a build, pages concatenated in the order served.
pub async fn fetch_all_artifacts<P>(
    provider: &P,
    app_slug: &str,
    build_slug: &str,
) -> Result<Vec<ArtifactRecord>>
where
    P: ArtifactProvider + ?Sized,
{
    let mut artifacts = Vec::new();
    let mut seen = HashSet::new();
    let mut next: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = provider
            .list_artifacts(app_slug, build_slug, next.as_deref())
            .await?;
        pages += 1;
        let cursor = page.next_cursor().map(str::to_string);
        artifacts.extend(page.data);

        match cursor {
            Some(cursor) => {
                if !seen.insert(cursor.clone()) {
                    return Err(ProviderError::CursorLoop(cursor));
                }
                next = Some(cursor);
            }
            None => break,
        }
    }

    debug!(
        event = "artifacts.fetched",
        app_slug,
        build_slug,
        pages,
        artifacts = artifacts.len(),
        "fetched artifact listing"
    );
    Ok(artifacts)
}

/// First artifact the provider can install on a device.
pub fn first_installable<'a, I>(records: I) -> Option<&'a ArtifactRecord>
where
    I: IntoIterator<Item = &'a ArtifactRecord>,
{
    records.into_iter().find(|r| r.is_installable())
}
