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

//! The recursive serialize/deserialize protocol.
//!
//! Structured objects serialize as a JSON mapping from child-group keys to
//! lists of child entries; each entry carries the child's type name and
//! either its hash (reference) or its inline serialization (composite).
//! Binary leaves stream their payload as a single JSON string token, so the
//! same bytes embed verbatim as a composite `"object"` value.
//!
//! All string framing goes through `serde_json`, so arbitrary content in
//! keys, names, and binary wire forms is escaped correctly.

use crate::context::Context;
use crate::descriptor::SerializationFormat;
use crate::error::{Error, Result};
use crate::object::Object;
use serde_json::Value;
use std::io::{Read, Write};

/// Window size for pumping buffered binary serializers.
pub(crate) const SERIALIZE_WINDOW: usize = 1024;

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Reference,
    Composite,
}

pub(crate) fn serialize(object: &Object, sink: &mut dyn Write, mode: Mode) -> Result<()> {
    let ty = object.type_descriptor();
    if ty.serializes_buffered() {
        let mut offset = 0u64;
        loop {
            let written = ty.serialize_data_buffered(object, offset, SERIALIZE_WINDOW, sink)?;
            if written < SERIALIZE_WINDOW {
                break;
            }
            offset += written as u64;
            sink.flush()?;
        }
        Ok(())
    } else if ty.serialization_format() == SerializationFormat::Binary {
        ty.serialize_data(object, sink)
    } else {
        serialize_structured(object, sink, mode)
    }
}

fn serialize_structured(object: &Object, sink: &mut dyn Write, mode: Mode) -> Result<()> {
    sink.write_all(b"{")?;
    let mut first = true;
    object
        .type_descriptor()
        .walk_children(object, &mut |key, children, group_composite| {
            if first {
                first = false;
            } else {
                sink.write_all(b",\n")?;
            }
            write_json_str(&mut *sink, key)?;
            sink.write_all(b": [")?;
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    sink.write_all(b",")?;
                }
                sink.write_all(b"{\"type\": ")?;
                write_json_str(&mut *sink, child.type_name())?;
                sink.write_all(b", ")?;
                if mode == Mode::Composite || group_composite {
                    sink.write_all(b"\"object\": ")?;
                    serialize(child, &mut *sink, Mode::Composite)?;
                } else {
                    sink.write_all(b"\"hash\": \"")?;
                    sink.write_all(child.hash()?.to_hex().as_bytes())?;
                    sink.write_all(b"\"")?;
                }
                sink.write_all(b"}")?;
            }
            sink.write_all(b"]")?;
            Ok(())
        })?;
    sink.write_all(b"}")?;
    Ok(())
}

fn write_json_str(sink: &mut dyn Write, text: &str) -> Result<()> {
    serde_json::to_writer(sink, text)?;
    Ok(())
}

pub(crate) fn deserialize(object: &Object, source: &mut dyn Read) -> Result<()> {
    let ty = object.type_descriptor();
    if ty.serialization_format() == SerializationFormat::Binary {
        let payload = ty.deserialize_data(object, source)?;
        object.set_data(payload);
        return Ok(());
    }
    let context = object
        .context()
        .ok_or_else(|| Error::MissingContext(object.type_name().to_owned()))?;
    let mut text = Vec::new();
    source.read_to_end(&mut text)?;
    let tree: Value = serde_json::from_slice(&text)?;
    object.set_data(ty.init_data()?);
    deserialize_structured(object, &tree, &context)
}

fn deserialize_structured(object: &Object, tree: &Value, context: &Context) -> Result<()> {
    let groups = tree
        .as_object()
        .ok_or_else(|| Error::corrupt("expected a child-group mapping"))?;
    for (key, group) in groups {
        let entries = group
            .as_array()
            .ok_or_else(|| Error::corrupt(format!("child group `{key}` is not a list")))?;
        let mut children = Vec::with_capacity(entries.len());
        for entry in entries {
            children.push(decode_child(entry, context)?);
        }
        object
            .type_descriptor()
            .store_children(object, key, children)?;
    }
    Ok(())
}

fn decode_child(entry: &Value, context: &Context) -> Result<Object> {
    let info = entry
        .as_object()
        .ok_or_else(|| Error::corrupt("child entry is not a mapping"))?;
    let type_name = info
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::corrupt("child entry missing `type`"))?;
    let ty = context.resolve(type_name)?;
    match (info.get("hash"), info.get("object")) {
        (Some(hash), None) => {
            let hash = hash
                .as_str()
                .ok_or_else(|| Error::corrupt("child `hash` is not a string"))?;
            Ok(Object::from_context(context, ty, hash.parse()?))
        }
        (None, Some(embedded)) => {
            let child = Object::with_context(context, ty);
            if ty.serialization_format() == SerializationFormat::Binary {
                // Re-frame the embedded string as a standalone wire token and
                // stream it back through the type's binary decoder.
                let text = embedded
                    .as_str()
                    .ok_or_else(|| Error::corrupt("embedded binary child is not a string"))?;
                let framed = serde_json::to_vec(text)?;
                let payload = ty.deserialize_data(&child, &mut framed.as_slice())?;
                child.set_data(payload);
            } else {
                child.set_data(ty.init_data()?);
                deserialize_structured(&child, embedded, context)?;
            }
            Ok(child)
        }
        (Some(_), Some(_)) => Err(Error::corrupt("child entry has both `hash` and `object`")),
        (None, None) => Err(Error::corrupt("child entry has neither `hash` nor `object`")),
    }
}
