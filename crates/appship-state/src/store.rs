//! App version persistence seam.
//!
//! Implementations must:
//! - assign a fresh id and equal `created_at`/`updated_at` on `create`
//! - return `StateError::NotFound` for unknown ids from `get` and `update`
//! - list an app's records newest first

use appship_core::AppVersion;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// A stored app version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppVersionRecord {
    pub id: Uuid,
    pub app_slug: String,
    pub version: AppVersion,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AppVersionRecord {
    pub fn new(app_slug: &str, version: AppVersion) -> Self {
        let now = Utc::now();
        AppVersionRecord {
            id: Uuid::new_v4(),
            app_slug: app_slug.to_string(),
            version,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Sort newest first; equal timestamps keep their incoming order.
pub(crate) fn newest_first(records: &mut [AppVersionRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[async_trait]
pub trait AppVersionStore: Send + Sync {
    /// Persist `version` under a new id.
    async fn create(&self, app_slug: &str, version: AppVersion) -> Result<AppVersionRecord>;

    async fn get(&self, id: Uuid) -> Result<AppVersionRecord>;

    /// Every record of the app, newest first.
    async fn list_for_app(&self, app_slug: &str) -> Result<Vec<AppVersionRecord>>;

    /// Replace the stored record with the same id and bump `updated_at`.
    async fn update(&self, record: AppVersionRecord) -> Result<AppVersionRecord>;
}
