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

//! The polymorphic type vtable.
//!
//! A [`TypeDescriptor`] is an immutable, statically allocated value
//! describing one logical type: its wire name, whether its payload may
//! mutate, how it serializes, and the hooks the engine dispatches through.
//! Every hook is optional with an erroring (or no-op) default; a usable type
//! provides either the binary hooks or the child-walk hooks.
//!
//! # Guard discipline
//!
//! Hook implementations access payloads through [`Object::data`]. They must
//! not hold the returned guard across a call back into the engine (emitting
//! a child group, comparing, serializing a child): clone the child handles
//! out first, drop the guard, then call. The exemplars in [`crate::types`]
//! all follow this shape.

use crate::error::{Error, Result};
use crate::object::{Object, Payload};
use std::cmp::Ordering;
use std::fmt::Debug;
use std::io::{Read, Write};

/// Display name for descriptors that do not provide one.
pub const UNNAMED_TYPE: &str = "Unnamed";

/// How a type's payload is represented on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializationFormat {
    /// An opaque leaf: the type streams its own bytes, framed as a single
    /// JSON string token so it can embed in composite serializations.
    Binary,
    /// A mapping of named child groups, produced by walking children.
    Structured,
}

/// The callback installed by the engine while walking children.
///
/// Invoked once per named group as `(key, children, composite)`. A group
/// flagged `composite` is embedded inline in the parent's serialization and
/// never stored separately; an unflagged group is linked by hash and stored
/// recursively.
pub type ChildWalker<'a> = dyn FnMut(&str, &[Object], bool) -> Result<()> + 'a;

/// Static description of one logical type.
pub trait TypeDescriptor: Debug + Send + Sync {
    /// Wire-level display name. Resolvers map this back to the descriptor
    /// during decoding.
    fn name(&self) -> &str {
        UNNAMED_TYPE
    }

    /// Whether payloads of this type never change after construction.
    /// Immutable objects memoize their hash; mutable objects re-verify it on
    /// every store.
    fn immutable(&self) -> bool;

    /// Which serialization protocol the engine uses for this type.
    fn serialization_format(&self) -> SerializationFormat;

    /// A fresh, empty payload for the structured decoder to fill through
    /// [`TypeDescriptor::store_children`].
    fn init_data(&self) -> Result<Payload> {
        Err(Error::unsupported(self.name(), "init_data"))
    }

    /// Whether [`TypeDescriptor::compare`] is provided. `false` routes
    /// comparison to the identity fallback.
    fn has_comparator(&self) -> bool {
        false
    }

    /// Total order over objects of this type.
    fn compare(&self, _a: &Object, _b: &Object) -> Result<Ordering> {
        Err(Error::unsupported(self.name(), "compare"))
    }

    /// One-shot binary serialization of the payload.
    fn serialize_data(&self, _object: &Object, _sink: &mut dyn Write) -> Result<()> {
        Err(Error::unsupported(self.name(), "serialize_data"))
    }

    /// Whether the engine should pump
    /// [`TypeDescriptor::serialize_data_buffered`] instead of calling
    /// [`TypeDescriptor::serialize_data`] once.
    fn serializes_buffered(&self) -> bool {
        false
    }

    /// Windowed binary serialization for large payloads: write up to `limit`
    /// bytes of the wire form starting at `offset`, returning the count
    /// actually written. The engine pumps windows, flushing between them,
    /// until a short count.
    fn serialize_data_buffered(
        &self,
        _object: &Object,
        _offset: u64,
        _limit: usize,
        _sink: &mut dyn Write,
    ) -> Result<usize> {
        Err(Error::unsupported(self.name(), "serialize_data_buffered"))
    }

    /// Decode a binary payload from its wire form.
    fn deserialize_data(&self, _object: &Object, _source: &mut dyn Read) -> Result<Payload> {
        Err(Error::unsupported(self.name(), "deserialize_data"))
    }

    /// Emit this object's child groups, in a deterministic order. The group
    /// order and in-group order feed directly into the object's hash.
    fn walk_children(&self, _object: &Object, _emit: &mut ChildWalker<'_>) -> Result<()> {
        Ok(())
    }

    /// Install a decoded child group into the payload. The engine passes
    /// ownership of the handles; keep what the payload needs.
    fn store_children(&self, _object: &Object, _key: &str, _children: Vec<Object>) -> Result<()> {
        Err(Error::unsupported(self.name(), "store_children"))
    }
}

/// Whether every object in the slice is of an immutable type.
pub fn all_immutable(objects: &[Object]) -> bool {
    objects.iter().all(Object::is_immutable)
}
