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

#![deny(unreachable_pub)]
#![deny(missing_docs)]
//! Content-addressed object graphs with pluggable persistence.
//!
//! This crate represents heterogeneous values (strings, byte blobs, arrays,
//! key/value pairs, dictionaries) as reference-counted [`Object`] handles.
//! Objects form a DAG through typed child relations, serialize into a
//! [`Store`] keyed by their digest, and page back in lazily on first access.
//! Each child group is persisted either by reference (a separate store entry,
//! linked by hash, deduplicated) or inline (embedded in the parent's entry).
//!
//! A [`Context`] binds a store to the resolvers that map wire-level type
//! names back to [`TypeDescriptor`]s during decoding. The exemplar value
//! types live in [`types`] and double as reference implementations of the
//! descriptor contract.

pub mod context;
pub mod descriptor;
pub mod error;
pub mod hash;
pub mod object;
pub mod store;
pub mod types;

mod wire;

pub use context::{Context, TypeResolver, core_resolver};
pub use descriptor::{ChildWalker, SerializationFormat, TypeDescriptor, UNNAMED_TYPE, all_immutable};
pub use error::{Error, Result};
pub use hash::{HASH_BYTES, HASH_HEX_LEN, HashWriter, ObjectHash};
pub use object::{Object, Payload};
pub use store::{InMemoryStore, Store, StoreSink};

/// The digest behind object identity.
pub type DefaultHasher = sha2::Sha256;
