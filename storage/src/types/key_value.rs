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

//! Immutable key/value pair: the two-group walker exemplar.

use crate::descriptor::{ChildWalker, SerializationFormat, TypeDescriptor};
use crate::error::{Error, Result};
use crate::object::{Object, Payload};
use std::cmp::Ordering;

#[derive(Debug, Default)]
struct KeyValueData {
    key: Option<Object>,
    value: Option<Object>,
}

/// Descriptor for key/value pairs.
#[derive(Debug)]
pub struct KeyValueType;

/// The key/value descriptor instance.
pub static KEY_VALUE: KeyValueType = KeyValueType;

impl TypeDescriptor for KeyValueType {
    fn name(&self) -> &str {
        "KeyValue"
    }

    fn immutable(&self) -> bool {
        true
    }

    fn serialization_format(&self) -> SerializationFormat {
        SerializationFormat::Structured
    }

    fn init_data(&self) -> Result<Payload> {
        Ok(Box::new(KeyValueData::default()))
    }

    fn has_comparator(&self) -> bool {
        true
    }

    /// Pairs order by their keys.
    fn compare(&self, a: &Object, b: &Object) -> Result<Ordering> {
        key(a)?.compare(&key(b)?)
    }

    fn walk_children(&self, object: &Object, emit: &mut ChildWalker<'_>) -> Result<()> {
        let (key, value) = {
            let data = object.data::<KeyValueData>()?;
            (data.key.clone(), data.value.clone())
        };
        let key = key.ok_or_else(|| Error::corrupt("key/value pair has no key"))?;
        let value = value.ok_or_else(|| Error::corrupt("key/value pair has no value"))?;
        emit("key", std::slice::from_ref(&key), false)?;
        emit("value", std::slice::from_ref(&value), false)
    }

    fn store_children(&self, object: &Object, key: &str, children: Vec<Object>) -> Result<()> {
        let mut children = children;
        let child = match (children.pop(), children.pop()) {
            (Some(child), None) => child,
            _ => {
                return Err(Error::corrupt(format!(
                    "pair group `{key}` must hold exactly one object"
                )));
            }
        };
        let mut data = object.data::<KeyValueData>()?;
        match key {
            "key" => data.key = Some(child),
            "value" => data.value = Some(child),
            other => {
                return Err(Error::corrupt(format!(
                    "pair has no child group `{other}`"
                )));
            }
        }
        Ok(())
    }
}

/// Author a pair. Both halves must be of immutable types.
pub fn create(key: &Object, value: &Object) -> Result<Object> {
    if !key.is_immutable() || !value.is_immutable() {
        return Err(Error::ImmutabilityViolated(KEY_VALUE.name().to_owned()));
    }
    Ok(Object::new(
        &KEY_VALUE,
        Box::new(KeyValueData {
            key: Some(key.clone()),
            value: Some(value.clone()),
        }),
    ))
}

/// The pair's key.
pub fn key(pair: &Object) -> Result<Object> {
    pair.data::<KeyValueData>()?
        .key
        .clone()
        .ok_or_else(|| Error::corrupt("key/value pair has no key"))
}

/// The pair's value.
pub fn value(pair: &Object) -> Result<Object> {
    pair.data::<KeyValueData>()?
        .value
        .clone()
        .ok_or_else(|| Error::corrupt("key/value pair has no value"))
}
