//! Property Tests
//!
//! Randomized round trips through the full write and read path.

use crate::*;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_string_roundtrip(value in ".*") {
        let data = create_data();
        prop_assert!(data.put("k", &value).unwrap());
        prop_assert_eq!(data.get::<String>("k").unwrap(), Some(value));
    }

    #[test]
    fn prop_list_roundtrip(ids in prop::collection::vec(any::<u32>(), 0..32)) {
        let data = create_data();
        let items: Vec<Item> = ids.into_iter().map(Item).collect();
        data.put("items", &items).unwrap();
        prop_assert_eq!(data.get::<Vec<Item>>("items").unwrap(), Some(items));
    }

    #[test]
    fn prop_set_roundtrip(values in prop::collection::btree_set(any::<i64>(), 0..32)) {
        let data = create_data();
        data.put("set", &values).unwrap();
        prop_assert_eq!(data.get::<BTreeSet<i64>>("set").unwrap(), Some(values));
    }

    #[test]
    fn prop_map_roundtrip(entries in prop::collection::btree_map("[a-z]{1,8}", any::<i32>(), 0..16)) {
        let data = create_data();
        data.put("map", &entries).unwrap();
        prop_assert_eq!(data.get::<BTreeMap<String, i32>>("map").unwrap(), Some(entries));
    }

    #[test]
    fn prop_salted_roundtrip(value in ".*", key in "[a-z]{1,12}", salt in "[a-zA-Z0-9]{0,8}") {
        let data = open(PersistenceBuilder::new().salt(salt));
        data.put(&key, &value).unwrap();
        prop_assert_eq!(data.get::<String>(&key).unwrap(), Some(value));
    }
}
