//! Contract tests for AppVersionStore.
//!
//! Every check runs against both the in-memory and the filesystem store.

use appship_core::{AppVersion, ArtifactInfo, Platform};
use appship_state::{
    AppVersionStore, FsAppVersionStore, MemoryAppVersionStore, StateError,
};
use uuid::Uuid;

fn version(build_slug: &str, flavour: &str) -> AppVersion {
    AppVersion::new(
        Platform::Android,
        build_slug,
        "42",
        "Bump version",
        flavour,
        &ArtifactInfo {
            build_type: "release".to_string(),
            ..Default::default()
        },
    )
    .unwrap()
}

async fn create_then_get(store: &dyn AppVersionStore) {
    let created = store.create("app-1", version("b1", "sweet")).await.unwrap();
    assert_eq!(created.created_at, created.updated_at);
    assert_eq!(created.app_slug, "app-1");

    let fetched = store.get(created.id).await.unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.version.artifact_info().unwrap().build_type, "release");
}

async fn get_unknown_is_not_found(store: &dyn AppVersionStore) {
    let id = Uuid::new_v4();
    match store.get(id).await {
        Err(StateError::NotFound(missing)) => assert_eq!(missing, id),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

async fn list_filters_by_app(store: &dyn AppVersionStore) {
    store.create("app-1", version("b1", "sweet")).await.unwrap();
    store.create("app-1", version("b1", "salty")).await.unwrap();
    store.create("app-2", version("b9", "")).await.unwrap();

    let listed = store.list_for_app("app-1").await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|r| r.app_slug == "app-1"));
    assert!(listed
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));
    assert!(store.list_for_app("app-3").await.unwrap().is_empty());
}

async fn update_replaces_version(store: &dyn AppVersionStore) {
    let mut record = store.create("app-1", version("b1", "sweet")).await.unwrap();
    let created_at = record.created_at;
    record.version.commit_message = "Amended".to_string();

    let updated = store.update(record.clone()).await.unwrap();
    assert_eq!(updated.created_at, created_at);
    assert!(updated.updated_at >= created_at);

    let fetched = store.get(record.id).await.unwrap();
    assert_eq!(fetched.version.commit_message, "Amended");
}

async fn update_unknown_is_not_found(store: &dyn AppVersionStore) {
    let mut record = store.create("app-1", version("b1", "sweet")).await.unwrap();
    record.id = Uuid::new_v4();
    assert!(matches!(
        store.update(record).await,
        Err(StateError::NotFound(_))
    ));
}

// ---- memory store ----

#[tokio::test]
async fn memory_create_then_get() {
    create_then_get(&MemoryAppVersionStore::new()).await;
}

#[tokio::test]
async fn memory_get_unknown_is_not_found() {
    get_unknown_is_not_found(&MemoryAppVersionStore::new()).await;
}

#[tokio::test]
async fn memory_list_filters_by_app() {
    list_filters_by_app(&MemoryAppVersionStore::new()).await;
}

#[tokio::test]
async fn memory_list_is_newest_first() {
    let store = MemoryAppVersionStore::new();
    let first = store.create("app-1", version("b1", "")).await.unwrap();
    let second = store.create("app-1", version("b2", "")).await.unwrap();

    let listed = store.list_for_app("app-1").await.unwrap();
    let ids: Vec<_> = listed.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn memory_update_replaces_version() {
    update_replaces_version(&MemoryAppVersionStore::new()).await;
}

#[tokio::test]
async fn memory_update_unknown_is_not_found() {
    update_unknown_is_not_found(&MemoryAppVersionStore::new()).await;
}

// ---- filesystem store ----

fn fs_store() -> (tempfile::TempDir, FsAppVersionStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = FsAppVersionStore::new(dir.path()).unwrap();
    (dir, store)
}

#[tokio::test]
async fn fs_create_then_get() {
    let (_dir, store) = fs_store();
    create_then_get(&store).await;
}

#[tokio::test]
async fn fs_get_unknown_is_not_found() {
    let (_dir, store) = fs_store();
    get_unknown_is_not_found(&store).await;
}

#[tokio::test]
async fn fs_list_filters_by_app() {
    let (_dir, store) = fs_store();
    list_filters_by_app(&store).await;
}

#[tokio::test]
async fn fs_update_replaces_version() {
    let (_dir, store) = fs_store();
    update_replaces_version(&store).await;
}

#[tokio::test]
async fn fs_update_unknown_is_not_found() {
    let (_dir, store) = fs_store();
    update_unknown_is_not_found(&store).await;
}
