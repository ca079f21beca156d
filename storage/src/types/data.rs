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

//! Immutable opaque byte blob.
//!
//! The wire form is the JSON string of the hex encoding, so the content is
//! escape-free and embeds verbatim in composite serializations. Large
//! payloads serialize through the buffered window protocol: the virtual
//! stream `"` + hex + `"` is emitted in engine-sized windows.

use crate::descriptor::{SerializationFormat, TypeDescriptor};
use crate::error::{Error, Result};
use crate::object::{Object, Payload};
use serde::Deserialize;
use std::cmp::Ordering;
use std::io::{Read, Write};

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Descriptor for byte-blob objects.
#[derive(Debug)]
pub struct DataType;

/// The data descriptor instance.
pub static DATA: DataType = DataType;

impl TypeDescriptor for DataType {
    fn name(&self) -> &str {
        "Data"
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
        Ok(bytes(a)?.cmp(&bytes(b)?))
    }

    fn serializes_buffered(&self) -> bool {
        true
    }

    fn serialize_data_buffered(
        &self,
        object: &Object,
        offset: u64,
        limit: usize,
        sink: &mut dyn Write,
    ) -> Result<usize> {
        let payload = object.data::<Vec<u8>>()?;
        // Virtual wire stream: opening quote, hex digits, closing quote.
        let total = 2 + payload.len() * 2;
        let start = offset as usize;
        if start >= total {
            return Ok(0);
        }
        let end = total.min(start + limit);
        let mut window = Vec::with_capacity(end - start);
        for pos in start..end {
            if pos == 0 || pos == total - 1 {
                window.push(b'"');
            } else {
                let nibble_pos = pos - 1;
                let byte = payload[nibble_pos / 2];
                let nibble = if nibble_pos % 2 == 0 { byte >> 4 } else { byte & 0xf };
                window.push(HEX_DIGITS[nibble as usize]);
            }
        }
        sink.write_all(&window)?;
        Ok(window.len())
    }

    fn deserialize_data(&self, _object: &Object, source: &mut dyn Read) -> Result<Payload> {
        let mut de = serde_json::Deserializer::from_reader(source);
        let text = String::deserialize(&mut de)?;
        let decoded = hex::decode(&text)
            .map_err(|err| Error::corrupt(format!("data payload is not hex: {err}")))?;
        Ok(Box::new(decoded))
    }
}

/// Author a byte-blob object.
pub fn create(contents: impl Into<Vec<u8>>) -> Object {
    Object::new(&DATA, Box::new(contents.into()))
}

/// The blob's bytes, paging the payload in if needed.
pub fn bytes(object: &Object) -> Result<Vec<u8>> {
    Ok(object.data::<Vec<u8>>()?.clone())
}

/// The blob's length in bytes.
pub fn len(object: &Object) -> Result<usize> {
    Ok(object.data::<Vec<u8>>()?.len())
}
