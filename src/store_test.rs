use super::*;

// =============================================================================
// MemoryStore
// =============================================================================

#[test]
fn memory_store_read_missing_is_none() {
    let store = MemoryStore::new();
    assert_eq!(store.read("nope").unwrap(), None);
    assert!(store.is_empty());
}

#[test]
fn memory_store_write_then_read() {
    let store = MemoryStore::new();
    store.write("k", "v1").unwrap();
    store.write("k", "v2").unwrap();
    assert_eq!(store.read("k").unwrap().as_deref(), Some("v2"));
    assert_eq!(store.len(), 1);
}

#[test]
fn memory_store_remove_absent_is_ok() {
    let store = MemoryStore::new();
    store.remove("ghost").unwrap();
    store.write("k", "v").unwrap();
    store.remove("k").unwrap();
    assert_eq!(store.read("k").unwrap(), None);
}

#[test]
fn memory_store_quota_rejects_oversized_write() {
    let store = MemoryStore::with_quota(8);
    store.write("k", "1234").unwrap();
    let err = store.write("other", "12345").unwrap_err();
    assert!(matches!(err, StoreError::QuotaExceeded { limit: 8, requested: 15 }));
    assert_eq!(store.read("other").unwrap(), None);
}

#[test]
fn memory_store_quota_ignores_replaced_entry() {
    let store = MemoryStore::with_quota(8);
    store.write("k", "1234567").unwrap();
    store.write("k", "7654321").unwrap();
    assert_eq!(store.read("k").unwrap().as_deref(), Some("7654321"));
}

// =============================================================================
// FileStore
// =============================================================================

#[test]
fn file_store_missing_file_reads_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("drafts.json"));
    assert_eq!(store.read("draft1").unwrap(), None);
}

#[test]
fn file_store_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drafts.json");

    FileStore::new(&path).write("draft1", r#"{"title":"x"}"#).unwrap();
    FileStore::new(&path).write("draft2", "2").unwrap();

    let reopened = FileStore::new(&path);
    assert_eq!(reopened.read("draft1").unwrap().as_deref(), Some(r#"{"title":"x"}"#));
    assert_eq!(reopened.read("draft2").unwrap().as_deref(), Some("2"));
}

#[test]
fn file_store_remove_deletes_only_that_key() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("drafts.json"));
    store.write("a", "1").unwrap();
    store.write("b", "2").unwrap();
    store.remove("a").unwrap();
    store.remove("a").unwrap();
    assert_eq!(store.read("a").unwrap(), None);
    assert_eq!(store.read("b").unwrap().as_deref(), Some("2"));
}

#[test]
fn file_store_corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drafts.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();
    let store = FileStore::new(&path);
    assert!(matches!(store.read("a"), Err(StoreError::Corrupt(_))));
    assert!(matches!(store.write("a", "1"), Err(StoreError::Corrupt(_))));
}
