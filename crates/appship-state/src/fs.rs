use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use appship_core::AppVersion;
use async_trait::async_trait;
use chrono::Utc;
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Result, StateError};
use crate::store::{newest_first, AppVersionRecord, AppVersionStore};

/// Filesystem-backed store, one pretty-printed JSON file per record.
///
/// Layout: `<root>/versions/<uuid>.json`
pub struct FsAppVersionStore {
    versions_dir: PathBuf,
}

impl FsAppVersionStore {
    /// Create a store rooted at `root`. Creates `root/versions/` if needed.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let versions_dir = root.as_ref().join("versions");
        fs::create_dir_all(&versions_dir)?;
        Ok(Self { versions_dir })
    }

    fn record_path(&self, id: Uuid) -> PathBuf {
        self.versions_dir.join(format!("{id}.json"))
    }

    fn write(&self, record: &AppVersionRecord) -> Result<()> {
        let data = serde_json::to_vec_pretty(record)?;

        // Atomic write: temp file in the same directory, then rename.
        let mut tmp = NamedTempFile::new_in(&self.versions_dir)?;
        tmp.write_all(&data)?;
        tmp.persist(self.record_path(record.id))
            .map_err(|e| e.error)?;
        debug!(id = %record.id, app_slug = %record.app_slug, "app version written");
        Ok(())
    }

    fn read(&self, id: Uuid) -> Result<AppVersionRecord> {
        let data = fs::read(self.record_path(id)).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StateError::NotFound(id)
            } else {
                StateError::Io(e)
            }
        })?;
        Ok(serde_json::from_slice(&data)?)
    }
}

#[async_trait]
impl AppVersionStore for FsAppVersionStore {
    async fn create(&self, app_slug: &str, version: AppVersion) -> Result<AppVersionRecord> {
        let record = AppVersionRecord::new(app_slug, version);
        self.write(&record)?;
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<AppVersionRecord> {
        self.read(id)
    }

    async fn list_for_app(&self, app_slug: &str) -> Result<Vec<AppVersionRecord>> {
        let mut found = Vec::new();
        for entry in fs::read_dir(&self.versions_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let record: AppVersionRecord = match serde_json::from_slice(&fs::read(&path)?) {
                Ok(record) => record,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable app version");
                    continue;
                }
            };
            if record.app_slug == app_slug {
                found.push(record);
            }
        }
        newest_first(&mut found);
        Ok(found)
    }

    async fn update(&self, mut record: AppVersionRecord) -> Result<AppVersionRecord> {
        let existing = self.read(record.id)?;
        record.created_at = existing.created_at;
        record.updated_at = Utc::now();
        self.write(&record)?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store() -> (tempfile::TempDir, FsAppVersionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsAppVersionStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn record_lands_in_versions_dir() {
        let (dir, store) = make_store();
        let record = store.create("app", AppVersion::default()).await.unwrap();
        let path = dir
            .path()
            .join("versions")
            .join(format!("{}.json", record.id));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn no_temp_files_left_behind() {
        let (dir, store) = make_store();
        store.create("app", AppVersion::default()).await.unwrap();
        store.create("app", AppVersion::default()).await.unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path().join("versions"))
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn corrupt_file_is_skipped_by_listing() {
        let (dir, store) = make_store();
        store.create("app", AppVersion::default()).await.unwrap();
        fs::write(dir.path().join("versions").join("junk.json"), b"{").unwrap();
        assert_eq!(store.list_for_app("app").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reopen_sees_existing_records() {
        let (dir, store) = make_store();
        let record = store.create("app", AppVersion::default()).await.unwrap();
        drop(store);

        let reopened = FsAppVersionStore::new(dir.path()).unwrap();
        assert_eq!(reopened.get(record.id).await.unwrap(), record);
    }
}
