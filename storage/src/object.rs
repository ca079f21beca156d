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

//! The uniform object handle and the persistence engine.
//!
//! An [`Object`] is a cheaply cloneable handle to one node in a persistable
//! value graph: a type descriptor, an optional in-memory payload, an
//! optional cached hash, a persisted flag, and an optional binding to the
//! [`Context`] consulted for lazy paging and name resolution. Cloning a
//! handle retains the node; dropping the last handle tears the payload down,
//! which in turn releases any child handles the payload owns.
//!
//! The documented contract is a single logical actor per object graph. The
//! internal locks make handles `Send`/`Sync` but do not promise semantics
//! under concurrent mutation of one graph.
//!
//! # Persistence states
//!
//! | state | payload | hash | persisted |
//! |---|---|---|---|
//! | authored | present | none | false |
//! | stored (immutable) | present | memoized | true |
//! | stored (mutable) | present | present | true |
//! | dirty (mutable) | present | stale | false on next store |
//! | lazy | absent | present | true |
//! | resident | present | present | true |
//!
//! [`Object::store`] moves authored and dirty objects to stored,
//! [`Object::load`] moves lazy to resident, and [`Object::unload`] moves
//! resident back to lazy.

use crate::context::Context;
use crate::descriptor::TypeDescriptor;
use crate::error::{Error, Result};
use crate::hash::{HashWriter, ObjectHash};
use crate::wire;
use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use std::any::Any;
use std::cmp::Ordering;
use std::fmt::{self, Debug};
use std::io::{Read, Write};
use std::sync::Arc;
use tracing::{debug, trace};

/// A type-erased payload. Each descriptor defines the concrete shape it
/// boxes here and downcasts through [`Object::data`].
pub type Payload = Box<dyn Any + Send + Sync>;

/// A reference-counted handle to a typed, possibly-paged value.
#[derive(Clone)]
pub struct Object {
    inner: Arc<ObjectInner>,
}

struct ObjectInner {
    ty: &'static dyn TypeDescriptor,
    state: Mutex<ObjectState>,
}

#[derive(Default)]
struct ObjectState {
    data: Option<Payload>,
    hash: Option<ObjectHash>,
    persisted: bool,
    context: Option<Context>,
}

impl Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Object")
            .field("type", &self.type_name())
            .field("resident", &state.data.is_some())
            .field("persisted", &state.persisted)
            .field("hash", &state.hash)
            .finish()
    }
}

impl Object {
    /// Author a new object with a fresh payload. Not persisted, no hash, no
    /// context.
    pub fn new(ty: &'static dyn TypeDescriptor, data: Payload) -> Object {
        Object {
            inner: Arc::new(ObjectInner {
                ty,
                state: Mutex::new(ObjectState {
                    data: Some(data),
                    ..ObjectState::default()
                }),
            }),
        }
    }

    /// A lazy reference to an object persisted under `hash` in the context's
    /// store. The payload pages in on first access.
    pub fn from_context(
        context: &Context,
        ty: &'static dyn TypeDescriptor,
        hash: ObjectHash,
    ) -> Object {
        Object {
            inner: Arc::new(ObjectInner {
                ty,
                state: Mutex::new(ObjectState {
                    hash: Some(hash),
                    persisted: true,
                    context: Some(context.clone()),
                    ..ObjectState::default()
                }),
            }),
        }
    }

    /// An empty object bound to a context, ready to be filled by
    /// [`Object::deserialize`]. Unlike [`Object::from_context`] it carries
    /// no hash and is not considered persisted.
    pub fn with_context(context: &Context, ty: &'static dyn TypeDescriptor) -> Object {
        Object {
            inner: Arc::new(ObjectInner {
                ty,
                state: Mutex::new(ObjectState {
                    context: Some(context.clone()),
                    ..ObjectState::default()
                }),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ObjectState> {
        self.inner.state.lock()
    }

    /// The object's type descriptor.
    pub fn type_descriptor(&self) -> &'static dyn TypeDescriptor {
        self.inner.ty
    }

    /// The descriptor's wire name.
    pub fn type_name(&self) -> &'static str {
        self.inner.ty.name()
    }

    /// Whether the object's type is immutable.
    pub fn is_immutable(&self) -> bool {
        self.inner.ty.immutable()
    }

    /// Number of live handles to this object.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Whether two handles refer to the same object.
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether the payload is currently in memory.
    pub fn is_resident(&self) -> bool {
        self.lock().data.is_some()
    }

    /// Whether the engine believes the current payload is faithfully stored
    /// under the cached hash.
    pub fn is_persisted(&self) -> bool {
        self.lock().persisted
    }

    /// The context this object is bound to, if any.
    pub fn context(&self) -> Option<Context> {
        self.lock().context.clone()
    }

    /// The cached hash, without computing one. Present for immutable objects
    /// that have been fingerprinted and for lazy references.
    pub fn cached_hash(&self) -> Option<ObjectHash> {
        self.lock().hash.clone()
    }

    pub(crate) fn set_data(&self, data: Payload) {
        self.lock().data = Some(data);
    }

    /// Typed access to the payload, paging it in first if needed.
    ///
    /// Panics if `T` is not the payload shape the descriptor defines; that
    /// is an engine-level type confusion, not a recoverable condition.
    pub fn data<T: Any>(&self) -> Result<MappedMutexGuard<'_, T>> {
        self.load()?;
        let guard = self.lock();
        Ok(MutexGuard::map(guard, |state| {
            state
                .data
                .as_mut()
                .expect("payload must be resident after load")
                .downcast_mut::<T>()
                .expect("payload shape must match the type descriptor")
        }))
    }

    /// Page the payload in from the store. A no-op when already resident;
    /// otherwise requires the context and hash of a lazy reference.
    pub fn load(&self) -> Result<()> {
        let (context, hash) = {
            let state = self.lock();
            if state.data.is_some() {
                return Ok(());
            }
            let context = state
                .context
                .clone()
                .ok_or_else(|| Error::MissingPayload(self.type_name().to_owned()))?;
            let hash = state
                .hash
                .clone()
                .ok_or_else(|| Error::MissingPayload(self.type_name().to_owned()))?;
            (context, hash)
        };
        debug!(type_name = self.type_name(), hash = %hash, "paging object in");
        let mut source = context.store().read(self.type_name(), &hash)?;
        self.deserialize(&mut *source)
    }

    /// Evict the payload, keeping the envelope pageable. Only meaningful for
    /// persisted objects; otherwise the payload would be unrecoverable, so
    /// the call is a no-op.
    pub fn unload(&self) {
        let evicted = {
            let mut state = self.lock();
            if state.persisted { state.data.take() } else { None }
        };
        if evicted.is_some() {
            trace!(type_name = self.type_name(), "payload evicted");
        }
    }

    /// Compare against another object.
    ///
    /// Identical handles are equal without consulting the comparator. A type
    /// without a comparator falls back to envelope address order: not a
    /// meaningful ordering, but total and stable within a run, which is
    /// sufficient for key uniqueness.
    pub fn compare(&self, other: &Object) -> Result<Ordering> {
        if self.ptr_eq(other) {
            return Ok(Ordering::Equal);
        }
        if self.inner.ty.has_comparator() {
            return self.inner.ty.compare(self, other);
        }
        let lhs = Arc::as_ptr(&self.inner) as usize;
        let rhs = Arc::as_ptr(&other.inner) as usize;
        Ok(lhs.cmp(&rhs))
    }

    /// Fingerprint the object's current state.
    ///
    /// Streams the reference-mode serialization through the digest, so a
    /// parent's hash is a function of its structure and its children's
    /// hashes. Immutable objects memoize the result; mutable objects
    /// recompute on every call.
    pub fn hash(&self) -> Result<ObjectHash> {
        if self.is_immutable() {
            if let Some(hash) = self.lock().hash.clone() {
                return Ok(hash);
            }
        }
        let mut sink = HashWriter::default();
        self.serialize(&mut sink)?;
        let hash = sink.finalize();
        if self.is_immutable() {
            self.lock().hash = Some(hash.clone());
        }
        Ok(hash)
    }

    /// Serialize in reference mode: children appear as `(type, hash)` links.
    pub fn serialize(&self, sink: &mut dyn Write) -> Result<()> {
        wire::serialize(self, sink, wire::Mode::Reference)
    }

    /// Serialize in composite mode: children are embedded inline, making the
    /// output self-contained.
    pub fn serialize_composite(&self, sink: &mut dyn Write) -> Result<()> {
        wire::serialize(self, sink, wire::Mode::Composite)
    }

    /// Reconstruct the payload from a serialized form, installing decoded
    /// children through the descriptor. Structured decoding requires a bound
    /// context for type-name resolution.
    pub fn deserialize(&self, source: &mut dyn Read) -> Result<()> {
        wire::deserialize(self, source)
    }

    /// Persist in reference mode: one store entry per distinct object in the
    /// subtree, children stored recursively. Idempotent for unchanged
    /// objects.
    pub fn store(&self, context: &Context) -> Result<()> {
        self.store_with_mode(context, false)
    }

    /// Persist in composite mode: a single store entry with the whole
    /// subtree embedded.
    pub fn store_composite(&self, context: &Context) -> Result<()> {
        self.store_with_mode(context, true)
    }

    fn store_with_mode(&self, context: &Context, composite: bool) -> Result<()> {
        let mut fresh = None;
        // A previously stored mutable object may have drifted from its
        // recorded fingerprint; re-verify before trusting the flag.
        let needs_check = {
            let state = self.lock();
            !self.is_immutable() && state.persisted
        };
        if needs_check {
            let recomputed = self.hash()?;
            let mut state = self.lock();
            if state.hash.as_ref() != Some(&recomputed) {
                state.persisted = false;
            }
            fresh = Some(recomputed);
        }
        if self.lock().persisted {
            return Ok(());
        }

        let hash = match fresh {
            Some(hash) => hash,
            None => self.hash()?,
        };
        debug!(type_name = self.type_name(), hash = %hash, composite, "storing object");
        let mut sink = context.store().write(self.type_name(), &hash)?;
        self.lock().context = Some(context.clone());
        if composite {
            self.serialize_composite(&mut *sink)?;
        } else {
            self.serialize(&mut *sink)?;
            self.inner.ty.walk_children(self, &mut |_key, children, group_composite| {
                // Composite-flagged groups live inside this entry.
                if group_composite {
                    return Ok(());
                }
                for child in children {
                    child.store(context)?;
                }
                Ok(())
            })?;
        }
        sink.commit()?;
        let mut state = self.lock();
        state.persisted = true;
        state.hash = Some(hash);
        Ok(())
    }
}

/// Compare two optional objects; an absent side orders first.
pub fn compare(a: Option<&Object>, b: Option<&Object>) -> Result<Ordering> {
    match (a, b) {
        (None, _) => Ok(Ordering::Less),
        (Some(_), None) => Ok(Ordering::Greater),
        (Some(a), Some(b)) => a.compare(b),
    }
}

/// Store each object in reference mode.
pub fn store_all(objects: &[Object], context: &Context) -> Result<()> {
    for object in objects {
        object.store(context)?;
    }
    Ok(())
}

/// Stable in-place sort driven by the polymorphic comparator.
pub fn sort(objects: &mut [Object]) -> Result<()> {
    let mut first_err = None;
    objects.sort_by(|a, b| match a.compare(b) {
        Ok(ordering) => ordering,
        Err(err) => {
            if first_err.is_none() {
                first_err = Some(err);
            }
            Ordering::Equal
        }
    });
    match first_err {
        None => Ok(()),
        Some(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::store::InMemoryStore;
    use crate::types::string;

    #[test]
    fn clone_and_drop_track_handles() {
        let object = string::create("x");
        assert_eq!(object.ref_count(), 1);
        let second = object.clone();
        assert_eq!(object.ref_count(), 2);
        assert!(object.ptr_eq(&second));
        drop(second);
        assert_eq!(object.ref_count(), 1);
    }

    #[test]
    fn authored_state() {
        let object = string::create("x");
        assert!(object.is_resident());
        assert!(!object.is_persisted());
        assert!(object.cached_hash().is_none());
        assert!(object.context().is_none());
    }

    #[test]
    fn unload_refuses_unpersisted() {
        let object = string::create("x");
        object.unload();
        assert!(object.is_resident());
    }

    #[test]
    fn load_without_hash_is_unrecoverable() {
        let context = Context::new(InMemoryStore::new());
        let blank = Object::with_context(&context, &string::STRING);
        assert!(matches!(blank.load(), Err(Error::MissingPayload(_))));
    }

    #[test]
    fn identity_fallback_is_stable() {
        // Dictionaries define no comparator.
        let a = crate::types::dictionary::create();
        let b = crate::types::dictionary::create();
        assert_eq!(a.compare(&a).unwrap(), Ordering::Equal);
        let ab = a.compare(&b).unwrap();
        let ba = b.compare(&a).unwrap();
        assert_ne!(ab, Ordering::Equal);
        assert_eq!(ab, ba.reverse());
        // Repeated comparison does not drift.
        assert_eq!(a.compare(&b).unwrap(), ab);
    }

    #[test]
    fn absent_side_orders_first() {
        let object = string::create("x");
        assert_eq!(compare(None, Some(&object)).unwrap(), Ordering::Less);
        assert_eq!(compare(Some(&object), None).unwrap(), Ordering::Greater);
        assert_eq!(compare(None, None).unwrap(), Ordering::Less);
    }

    #[test]
    fn immutable_hash_is_memoized() {
        let object = string::create("hello");
        let first = object.hash().unwrap();
        assert_eq!(object.cached_hash(), Some(first.clone()));
        assert_eq!(object.hash().unwrap(), first);
    }
}
