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

//! Mutable dictionary over key/value pair entries.
//!
//! Entries keep insertion order, so the child walk (and therefore the hash)
//! is deterministic for a given logical state. Lookup compares keys through
//! the polymorphic comparator; the dictionary itself defines no comparator
//! and so exercises the identity fallback.

use crate::descriptor::{ChildWalker, SerializationFormat, TypeDescriptor};
use crate::error::{Error, Result};
use crate::object::{Object, Payload};
use crate::types::key_value;
use std::cmp::Ordering;

#[derive(Debug, Default)]
struct DictionaryData {
    entries: Vec<Object>,
}

/// Descriptor for dictionaries.
#[derive(Debug)]
pub struct DictionaryType;

/// The dictionary descriptor instance.
pub static DICTIONARY: DictionaryType = DictionaryType;

impl TypeDescriptor for DictionaryType {
    fn name(&self) -> &str {
        "Dictionary"
    }

    fn immutable(&self) -> bool {
        false
    }

    fn serialization_format(&self) -> SerializationFormat {
        SerializationFormat::Structured
    }

    fn init_data(&self) -> Result<Payload> {
        Ok(Box::new(DictionaryData::default()))
    }

    fn walk_children(&self, object: &Object, emit: &mut ChildWalker<'_>) -> Result<()> {
        let entries = object.data::<DictionaryData>()?.entries.clone();
        emit("entries", &entries, false)
    }

    fn store_children(&self, object: &Object, key: &str, children: Vec<Object>) -> Result<()> {
        if key != "entries" {
            return Err(Error::corrupt(format!(
                "dictionary has no child group `{key}`"
            )));
        }
        object.data::<DictionaryData>()?.entries = children;
        Ok(())
    }
}

/// Author an empty dictionary.
pub fn create() -> Object {
    Object::new(&DICTIONARY, Box::new(DictionaryData::default()))
}

fn position_of(dictionary: &Object, key: &Object) -> Result<Option<usize>> {
    let entries = dictionary.data::<DictionaryData>()?.entries.clone();
    for (index, entry) in entries.iter().enumerate() {
        if key_value::key(entry)?.compare(key)? == Ordering::Equal {
            return Ok(Some(index));
        }
    }
    Ok(None)
}

/// Bind `key` to `value`, replacing an existing binding with an equal key.
/// Both must be of immutable types.
pub fn set(dictionary: &Object, key: &Object, value: &Object) -> Result<()> {
    let entry = key_value::create(key, value)?;
    let existing = position_of(dictionary, key)?;
    let mut data = dictionary.data::<DictionaryData>()?;
    match existing {
        Some(index) => data.entries[index] = entry,
        None => data.entries.push(entry),
    }
    Ok(())
}

/// The value bound to an equal key, if any.
pub fn get(dictionary: &Object, key: &Object) -> Result<Option<Object>> {
    match position_of(dictionary, key)? {
        Some(index) => {
            let entry = dictionary.data::<DictionaryData>()?.entries[index].clone();
            Ok(Some(key_value::value(&entry)?))
        }
        None => Ok(None),
    }
}

/// Drop the binding with an equal key; `false` when absent.
pub fn remove(dictionary: &Object, key: &Object) -> Result<bool> {
    match position_of(dictionary, key)? {
        Some(index) => {
            dictionary.data::<DictionaryData>()?.entries.remove(index);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Number of bindings.
pub fn len(dictionary: &Object) -> Result<usize> {
    Ok(dictionary.data::<DictionaryData>()?.entries.len())
}

/// All keys, in insertion order.
pub fn keys(dictionary: &Object) -> Result<Vec<Object>> {
    let entries = dictionary.data::<DictionaryData>()?.entries.clone();
    entries.iter().map(key_value::key).collect()
}

/// All entry pairs, in insertion order.
pub fn entries(dictionary: &Object) -> Result<Vec<Object>> {
    Ok(dictionary.data::<DictionaryData>()?.entries.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::string;

    #[test]
    fn set_get_remove() {
        let dict = create();
        let name = string::create("name");
        set(&dict, &name, &string::create("ada")).unwrap();
        set(&dict, &string::create("role"), &string::create("engineer")).unwrap();
        assert_eq!(len(&dict).unwrap(), 2);

        // Key equality goes through the comparator, so a fresh, equal
        // string finds the binding.
        let found = get(&dict, &string::create("name")).unwrap().unwrap();
        assert_eq!(string::value(&found).unwrap(), "ada");

        set(&dict, &string::create("name"), &string::create("grace")).unwrap();
        assert_eq!(len(&dict).unwrap(), 2);
        let replaced = get(&dict, &name).unwrap().unwrap();
        assert_eq!(string::value(&replaced).unwrap(), "grace");

        assert!(remove(&dict, &name).unwrap());
        assert!(!remove(&dict, &name).unwrap());
        assert!(get(&dict, &name).unwrap().is_none());
    }

    #[test]
    fn keys_keep_insertion_order() {
        let dict = create();
        for k in ["one", "two", "three"] {
            set(&dict, &string::create(k), &string::create("v")).unwrap();
        }
        let ordered: Vec<String> = keys(&dict)
            .unwrap()
            .iter()
            .map(|k| string::value(k).unwrap())
            .collect();
        assert_eq!(ordered, ["one", "two", "three"]);
    }
}
