//! File Store Tests
//!
//! Persistence across reopen and snapshot corruption, driven through `Data`.

use crate::*;
use std::collections::HashMap;
use strata_persist::FileStore;
use std::fs;
use tempfile::TempDir;

fn on_disk(dir: &TempDir) -> PersistenceBuilder {
    PersistenceBuilder::new()
        .storage_tag("prefs")
        .data_dir(dir.path())
        .register::<Item>()
        .register::<Profile>()
}

#[test]
fn test_values_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let profile = Profile {
        name: "Grace".into(),
        tags: vec!["cobol".into()],
        score: 7.0,
    };
    let mut map = HashMap::new();
    map.insert("a".to_string(), 1i32);

    {
        let data = open(on_disk(&dir));
        data.put("profile", &profile).unwrap();
        data.put("items", &vec![Item(1), Item(2)]).unwrap();
        data.put("map", &map).unwrap();
        assert!(data.shutdown());
    }

    let data = open(on_disk(&dir));
    assert_eq!(data.count().unwrap(), 3);
    assert_eq!(data.get::<Profile>("profile").unwrap(), Some(profile));
    assert_eq!(data.get::<Vec<Item>>("items").unwrap(), Some(vec![Item(1), Item(2)]));
    assert_eq!(data.get::<HashMap<String, i32>>("map").unwrap(), Some(map));
}

#[test]
fn test_snapshot_file_is_named_after_tag() {
    let dir = TempDir::new().unwrap();
    let data = open(on_disk(&dir));
    data.put("n", &42i32).unwrap();

    let text = fs::read_to_string(dir.path().join("prefs.json")).unwrap();
    assert!(text.contains("NDI="));
}

#[test]
fn test_tag_cannot_escape_data_dir() {
    let dir = TempDir::new().unwrap();
    let inner = dir.path().join("inner");
    for tag in ["../escaped", "nested/prefs", ".."] {
        let err = PersistenceBuilder::new()
            .storage_tag(tag)
            .data_dir(&inner)
            .build()
            .err()
            .unwrap();
        assert!(err.is_validation(), "tag {:?}", tag);
    }

    // A custom FileStore bypasses the builder check but not the store's own
    let builder = PersistenceBuilder::new()
        .storage_tag("../escaped")
        .store(std::sync::Arc::new(FileStore::new()));
    let ctx = builder.context().with_data_dir(&inner);
    let data = builder.build().unwrap();
    assert!(data.initialize(&ctx).unwrap_err().is_validation());
    assert!(!data.is_built());
    assert!(!dir.path().join("escaped.json").exists());
}

#[test]
fn test_writes_commit_without_shutdown() {
    let dir = TempDir::new().unwrap();
    {
        let data = open(on_disk(&dir));
        data.put("k", &Item(3)).unwrap();
        assert!(data.terminate());
    }
    let data = open(on_disk(&dir));
    assert_eq!(data.get::<Item>("k").unwrap(), Some(Item(3)));
}

#[test]
fn test_deletes_survive_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let data = open(on_disk(&dir));
        data.put("user:1", &Item(1)).unwrap();
        data.put("user:2", &Item(2)).unwrap();
        data.put("keep", &Item(3)).unwrap();
        data.delete_keys_with_prefix("user:").unwrap();
        data.shutdown();
    }
    let data = open(on_disk(&dir));
    assert_eq!(data.count().unwrap(), 1);
    assert!(data.contains("keep").unwrap());
}

#[test]
fn test_corrupt_snapshot_fails_initialize() {
    let dir = TempDir::new().unwrap();
    {
        let data = open(on_disk(&dir));
        data.put("k", &1i32).unwrap();
        data.shutdown();
    }
    let path = dir.path().join("prefs.json");
    let text = fs::read_to_string(&path).unwrap();
    fs::write(&path, text.replace("\"k\"", "\"j\"")).unwrap();

    let builder = on_disk(&dir);
    let ctx = builder.context();
    let data = builder.build().unwrap();
    let err = data.initialize(&ctx).unwrap_err();
    assert!(matches!(err, Error::Core(persist_core::Error::Storage(_))));
    assert!(!data.is_built());
    assert!(data.count().unwrap_err().is_not_built());
}

#[test]
fn test_separate_tags_are_separate_files() {
    let dir = TempDir::new().unwrap();
    let a = open(on_disk(&dir).storage_tag("a"));
    let b = open(on_disk(&dir).storage_tag("b"));

    a.put("k", &1i32).unwrap();
    assert!(!b.contains("k").unwrap());
    assert!(dir.path().join("a.json").exists());
}
