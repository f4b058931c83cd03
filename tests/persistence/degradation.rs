//! Degraded Read Tests
//!
//! Values written by a process that knew a type, read back by one that
//! does not, plus empty collections that carry no element names.

use crate::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use strata_persist::{Dynamic, MemoryStore, ShapeTag};

/// Writer knows `Item`, reader only knows the builtins; both share a store
fn writer_and_reader() -> (Data, Data) {
    let store = Arc::new(MemoryStore::new());
    let writer = open(
        PersistenceBuilder::new()
            .store(store.clone())
            .register::<Item>(),
    );
    let reader = open(PersistenceBuilder::new().store(store));
    (writer, reader)
}

// =============================================================================
// EMPTY COLLECTIONS
// =============================================================================

#[test]
fn test_empty_set_reads_back_empty() {
    let data = create_data();
    data.put("set", &HashSet::<Item>::new()).unwrap();

    let decoded = data.get_value("set").unwrap().unwrap();
    assert_eq!(decoded.shape(), ShapeTag::Set);
    assert!(decoded.is_empty());
    assert_eq!(data.get::<HashSet<Item>>("set").unwrap(), Some(HashSet::new()));
}

#[test]
fn test_empty_list_and_map_read_back_empty() {
    let data = create_data();
    data.put("list", &Vec::<Item>::new()).unwrap();
    data.put("map", &HashMap::<String, Item>::new()).unwrap();

    assert_eq!(data.get::<Vec<Item>>("list").unwrap(), Some(Vec::new()));
    assert_eq!(data.get::<HashMap<String, Item>>("map").unwrap(), Some(HashMap::new()));
}

// =============================================================================
// UNRESOLVED TYPE NAMES
// =============================================================================

#[test]
fn test_unknown_object_type_is_generic() {
    let (writer, reader) = writer_and_reader();
    writer.put("item", &Item(7)).unwrap();

    match reader.get_value("item").unwrap() {
        Some(Decoded::Object(Dynamic::Generic(value))) => assert_eq!(value, 7),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_unknown_list_type_keeps_generic_elements() {
    let (writer, reader) = writer_and_reader();
    writer.put("items", &vec![Item(1), Item(2)]).unwrap();

    let decoded = reader.get_value("items").unwrap().unwrap();
    assert_eq!(decoded.shape(), ShapeTag::List);
    assert_eq!(decoded.len(), 2);
    match decoded {
        Decoded::List(elements) => assert!(elements.iter().all(|e| !e.is_typed())),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_unknown_set_type_is_empty() {
    let (writer, reader) = writer_and_reader();
    let set: HashSet<Item> = [Item(1), Item(2)].into_iter().collect();
    writer.put("set", &set).unwrap();

    let decoded = reader.get_value("set").unwrap().unwrap();
    assert_eq!(decoded.shape(), ShapeTag::Set);
    assert!(decoded.is_empty());
}

#[test]
fn test_map_with_one_unknown_side_is_empty() {
    let (writer, reader) = writer_and_reader();
    let mut map = HashMap::new();
    map.insert("a".to_string(), Item(1));
    writer.put("map", &map).unwrap();

    let decoded = reader.get_value("map").unwrap().unwrap();
    assert_eq!(decoded.shape(), ShapeTag::Map);
    assert!(decoded.is_empty());

    // The writer still reads it in full
    assert_eq!(writer.get::<HashMap<String, Item>>("map").unwrap(), Some(map));
}

// =============================================================================
// CORRUPT OR FOREIGN DATA
// =============================================================================

#[test]
fn test_malformed_envelope_is_absent() {
    let store = Arc::new(MemoryStore::new());
    let data = open(PersistenceBuilder::new().store(store.clone()));
    store.put("bad", "{\"payload\":");

    assert!(data.contains("bad").unwrap());
    assert!(data.get_value("bad").unwrap().is_none());
    assert_eq!(data.get_or("bad", 5i32).unwrap(), 5);
}

#[test]
fn test_bad_element_fails_whole_read() {
    let store = Arc::new(MemoryStore::new());
    let data = open(PersistenceBuilder::new().store(store.clone()));
    // "[1,\"x\"]" in base64, recorded as a list of Integer
    store.put(
        "list",
        r#"{"payload":"WzEsIngiXQ==","shapeTag":"1","keyTypeName":"Integer"}"#,
    );
    assert!(data.get_value("list").unwrap().is_none());
}

#[test]
fn test_wrong_salt_is_absent() {
    let store = Arc::new(MemoryStore::new());
    let writer = open(PersistenceBuilder::new().store(store.clone()).salt("one"));
    let reader = open(PersistenceBuilder::new().store(store).salt("two"));

    writer.put("k", &1i32).unwrap();
    assert_eq!(writer.get::<i32>("k").unwrap(), Some(1));
    assert_eq!(reader.get::<i32>("k").unwrap(), None);
}
