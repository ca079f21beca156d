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

//! Immutable UTF-8 string leaf. The wire form is the JSON string of the
//! contents.

use crate::descriptor::{SerializationFormat, TypeDescriptor};
use crate::error::Result;
use crate::object::{Object, Payload};
use serde::Deserialize;
use std::cmp::Ordering;
use std::io::{Read, Write};

/// Descriptor for string objects.
#[derive(Debug)]
pub struct StringType;

/// The string descriptor instance.
pub static STRING: StringType = StringType;

impl TypeDescriptor for StringType {
    fn name(&self) -> &str {
        "String"
    }

    fn immutable(&self) -> bool {
        true
    }

    fn serialization_format(&self) -> SerializationFormat {
        SerializationFormat::Binary
    }

    fn has_comparator(&self) -> bool {
        true
    }

    fn compare(&self, a: &Object, b: &Object) -> Result<Ordering> {
        Ok(value(a)?.cmp(&value(b)?))
    }

    fn serialize_data(&self, object: &Object, sink: &mut dyn Write) -> Result<()> {
        let contents = object.data::<String>()?;
        serde_json::to_writer(sink, &*contents)?;
        Ok(())
    }

    fn deserialize_data(&self, _object: &Object, source: &mut dyn Read) -> Result<Payload> {
        let mut de = serde_json::Deserializer::from_reader(source);
        let contents = String::deserialize(&mut de)?;
        Ok(Box::new(contents))
    }
}

/// Author a string object.
pub fn create(contents: impl Into<String>) -> Object {
    Object::new(&STRING, Box::new(contents.into()))
}

/// The string's contents, paging the payload in if needed.
pub fn value(object: &Object) -> Result<String> {
    Ok(object.data::<String>()?.clone())
}
