// This file is part of hoard.
// Copyright (C) 2025 Hoard Contributors
// SPDX-License-Identifier: Apache-2.0
// Licensed under the Apache License, Version 2.0 (the "License");
// You may not use this file except in compliance with the License.
// You may obtain a copy of the License at
// http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! End-to-end persistence flows against the in-memory store.

use hoard_storage::types::{array, string};
use hoard_storage::{Context, InMemoryStore, Object};
use itertools::Itertools;

fn context() -> (Context, InMemoryStore) {
    let store = InMemoryStore::new();
    (Context::new(store.clone()), store)
}

fn strings(texts: &[&str]) -> Vec<Object> {
    texts.iter().map(|t| string::create(*t)).collect()
}

#[test]
fn string_leaf_stores_and_reloads() {
    let (context, store) = context();
    let object = string::create("hello");
    let hash = object.hash().unwrap();

    object.store(&context).unwrap();
    assert_eq!(store.len(), 1);
    assert!(store.contains("String", &hash));
    assert!(object.is_persisted());
    assert!(object.context().is_some());

    let lazy = Object::from_context(&context, &string::STRING, hash);
    assert!(!lazy.is_resident());
    assert_eq!(string::value(&lazy).unwrap(), "hello");
    assert!(lazy.is_resident());
}

#[test]
fn hash_is_stable_across_store_round_trips() {
    let (context, _) = context();
    let object = string::create("hello");
    let before = object.hash().unwrap();
    object.store(&context).unwrap();

    let lazy = Object::from_context(&context, &string::STRING, before.clone());
    lazy.load().unwrap();
    // Recompute from the reloaded payload rather than trusting the cache.
    let fresh = string::create(string::value(&lazy).unwrap());
    assert_eq!(fresh.hash().unwrap(), before);
}

#[test]
fn array_store_writes_children_by_reference() {
    let (context, store) = context();
    let array = array::create(&strings(&["a", "b", "c"])).unwrap();
    array.store(&context).unwrap();

    // Three string entries plus the array entry.
    assert_eq!(store.len(), 4);

    let entry = store.entry("Array", &array.hash().unwrap()).unwrap();
    let text = String::from_utf8(entry).unwrap();
    assert!(text.contains("\"type\": \"String\""));
    assert!(!text.contains("\"object\""));
    for element in array::objects(&array).unwrap() {
        assert!(text.contains(&element.hash().unwrap().to_hex()));
    }
}

#[test]
fn composite_store_writes_a_single_entry() {
    let (context, store) = context();
    let array = array::create(&strings(&["a", "b", "c"])).unwrap();
    array.store_composite(&context).unwrap();

    assert_eq!(store.len(), 1);
    let entry = store.entry("Array", &array.hash().unwrap()).unwrap();
    let text = String::from_utf8(entry).unwrap();
    assert!(text.contains("\"object\": \"a\""));
    assert!(text.contains("\"object\": \"c\""));
    assert!(!text.contains("\"hash\""));
}

#[test]
fn storing_twice_is_one_physical_write() {
    let (context, store) = context();
    let array = array::create(&strings(&["a", "b", "c"])).unwrap();
    array.store(&context).unwrap();
    let writes = store.writes();
    array.store(&context).unwrap();
    assert_eq!(store.writes(), writes);
}

#[test]
fn mutation_rewrites_under_a_new_hash() {
    let (context, store) = context();
    let array = array::mutable::create(&strings(&["x"]));
    array.store(&context).unwrap();
    let first = array.cached_hash().unwrap();

    array::mutable::push(&array, &string::create("y")).unwrap();
    array.store(&context).unwrap();
    let second = array.cached_hash().unwrap();

    assert_ne!(first, second);
    assert!(store.contains("MutableArray", &first));
    assert!(store.contains("MutableArray", &second));
}

#[test]
fn unchanged_mutable_store_is_a_no_op() {
    let (context, store) = context();
    let array = array::mutable::create(&strings(&["x"]));
    array.store(&context).unwrap();
    let writes = store.writes();
    array.store(&context).unwrap();
    assert_eq!(store.writes(), writes);
}

#[test]
fn lazy_paging_reads_one_entry_per_object() {
    let (context, store) = context();
    let hash = {
        let array = array::create(&strings(&["a", "b", "c"])).unwrap();
        array.store(&context).unwrap();
        array.hash().unwrap()
    };

    let lazy = Object::from_context(&context, &array::ARRAY, hash);
    assert_eq!(store.reads(), 0);

    // Length pages in the array entry only; elements stay lazy.
    assert_eq!(array::len(&lazy).unwrap(), 3);
    assert_eq!(store.reads(), 1);

    let first = array::get(&lazy, 0).unwrap().unwrap();
    assert_eq!(store.reads(), 1);
    assert_eq!(string::value(&first).unwrap(), "a");
    assert_eq!(store.reads(), 2);
}

#[test]
fn eviction_and_reload_cycle() {
    let (context, store) = context();
    let object = string::create("hello");
    object.store(&context).unwrap();

    object.unload();
    assert!(!object.is_resident());

    let reads = store.reads();
    assert_eq!(string::value(&object).unwrap(), "hello");
    assert_eq!(store.reads(), reads + 1);
    assert!(object.is_resident());

    // Still pageable after repeated cycles.
    object.unload();
    assert_eq!(string::value(&object).unwrap(), "hello");
}

#[test]
fn reloaded_graph_is_structurally_equal() {
    let (context, store) = context();
    let original = array::create(&strings(&["pear", "apple", "plum"])).unwrap();
    let hash = original.hash().unwrap();
    original.store(&context).unwrap();
    drop(original);

    let reloaded = Object::from_context(&context, &array::ARRAY, hash.clone());
    let values = array::objects(&reloaded)
        .unwrap()
        .iter()
        .map(|o| string::value(o).unwrap())
        .collect_vec();
    assert_eq!(values, ["pear", "apple", "plum"]);

    // Rebuilding the same logical state reproduces the fingerprint.
    let rebuilt = array::create(&strings(&["pear", "apple", "plum"])).unwrap();
    assert_eq!(rebuilt.hash().unwrap(), hash);
    assert!(store.contains("Array", &hash));
}

#[test]
fn dropping_handles_releases_children() {
    let element = string::create("x");
    let array = array::create(std::slice::from_ref(&element)).unwrap();
    assert_eq!(element.ref_count(), 2);
    drop(array);
    assert_eq!(element.ref_count(), 1);
}

#[test]
fn store_all_persists_each_object() {
    let (context, store) = context();
    let objects = strings(&["a", "b"]);
    hoard_storage::object::store_all(&objects, &context).unwrap();
    assert_eq!(store.len(), 2);
}
