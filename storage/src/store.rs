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

//! The backing-store capability.
//!
//! A [`Store`] is a narrow, location-agnostic byte sink/source keyed by
//! `(type name, hash)`. Stores are "dumb": the engine above them owns all
//! logical consistency. From the engine's perspective the store is
//! append-only; [`Store::delete`] exists for adapters and their callers, the
//! persistence flows never invoke it.
//!
//! Writes publish atomically: bytes go to a [`StoreSink`] and become visible
//! only on [`StoreSink::commit`]. An adapter backed by real files should get
//! the same effect by writing to a temporary and renaming on commit.

use crate::error::Result;
use crate::hash::ObjectHash;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::Debug;
use std::io::{self, Cursor, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// A writable entry that publishes on commit.
///
/// Dropping a sink without committing discards the bytes; no entry becomes
/// visible.
pub trait StoreSink: Write {
    /// Atomically publish everything written so far.
    fn commit(self: Box<Self>) -> Result<()>;
}

/// A content-addressed backing store.
pub trait Store: Debug + Send + Sync + 'static {
    /// Open a sink for the entry keyed by `(type_name, hash)`.
    fn write(&self, type_name: &str, hash: &ObjectHash) -> Result<Box<dyn StoreSink + '_>>;

    /// Open a source for an existing entry.
    fn read(&self, type_name: &str, hash: &ObjectHash) -> Result<Box<dyn Read + '_>>;

    /// Remove an entry.
    fn delete(&self, type_name: &str, hash: &ObjectHash) -> Result<()>;
}

/// A store backed by an in-memory map.
///
/// Clones share the same map, so a handle kept aside observes entries (and
/// the [`reads`](InMemoryStore::reads)/[`writes`](InMemoryStore::writes)
/// counters) produced through a context.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: Mutex<HashMap<(String, ObjectHash), Arc<[u8]>>>,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an entry exists for `(type_name, hash)`.
    pub fn contains(&self, type_name: &str, hash: &ObjectHash) -> bool {
        self.inner
            .entries
            .lock()
            .contains_key(&(type_name.to_owned(), hash.clone()))
    }

    /// Raw bytes of an entry, if present.
    pub fn entry(&self, type_name: &str, hash: &ObjectHash) -> Option<Vec<u8>> {
        self.inner
            .entries
            .lock()
            .get(&(type_name.to_owned(), hash.clone()))
            .map(|bytes| bytes.to_vec())
    }

    /// Number of sources opened so far.
    pub fn reads(&self) -> u64 {
        self.inner.reads.load(Ordering::Relaxed)
    }

    /// Number of committed writes so far.
    pub fn writes(&self) -> u64 {
        self.inner.writes.load(Ordering::Relaxed)
    }
}

impl Store for InMemoryStore {
    fn write(&self, type_name: &str, hash: &ObjectHash) -> Result<Box<dyn StoreSink + '_>> {
        Ok(Box::new(InMemorySink {
            inner: &self.inner,
            key: (type_name.to_owned(), hash.clone()),
            buf: Vec::new(),
        }))
    }

    fn read(&self, type_name: &str, hash: &ObjectHash) -> Result<Box<dyn Read + '_>> {
        let entry = self
            .inner
            .entries
            .lock()
            .get(&(type_name.to_owned(), hash.clone()))
            .cloned()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no store entry for ({type_name}, {hash})"),
                )
            })?;
        self.inner.reads.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(Cursor::new(entry)))
    }

    fn delete(&self, type_name: &str, hash: &ObjectHash) -> Result<()> {
        let removed = self
            .inner
            .entries
            .lock()
            .remove(&(type_name.to_owned(), hash.clone()));
        match removed {
            Some(_) => Ok(()),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no store entry for ({type_name}, {hash})"),
            )
            .into()),
        }
    }
}

struct InMemorySink<'a> {
    inner: &'a Inner,
    key: (String, ObjectHash),
    buf: Vec<u8>,
}

impl Write for InMemorySink<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl StoreSink for InMemorySink<'_> {
    fn commit(self: Box<Self>) -> Result<()> {
        let this = *self;
        trace!(type_name = %this.key.0, hash = %this.key.1, bytes = this.buf.len(), "store entry committed");
        this.inner.entries.lock().insert(this.key, this.buf.into());
        this.inner.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
