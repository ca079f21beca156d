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

//! Binding of a store to the resolvers consulted during decoding.

use crate::descriptor::TypeDescriptor;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types;
use std::fmt::{self, Debug};
use std::sync::Arc;

/// Maps a wire-level type name to its descriptor, or `None` when the name is
/// not this resolver's to answer.
pub type TypeResolver = Box<dyn Fn(&str) -> Option<&'static dyn TypeDescriptor> + Send + Sync>;

/// A store plus an ordered resolver chain.
///
/// The context is the ambient value threaded through persistence: objects
/// page in from its store, and decoding maps child type names through its
/// resolvers, first hit wins. Cloning is cheap and clones share state.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    store: Arc<dyn Store>,
    resolvers: Vec<TypeResolver>,
}

impl Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("store", &self.inner.store)
            .field("resolvers", &self.inner.resolvers.len())
            .finish()
    }
}

impl Context {
    /// Bind a store, resolving names through [`core_resolver`] alone.
    pub fn new(store: impl Store) -> Self {
        Self::with_resolvers(store, Vec::new())
    }

    /// Bind a store with a custom resolver chain. An empty chain falls back
    /// to [`core_resolver`]; callers who want both list it explicitly, in
    /// the position where it should be consulted.
    pub fn with_resolvers(store: impl Store, mut resolvers: Vec<TypeResolver>) -> Self {
        if resolvers.is_empty() {
            resolvers.push(Box::new(core_resolver));
        }
        Context {
            inner: Arc::new(ContextInner {
                store: Arc::new(store),
                resolvers,
            }),
        }
    }

    /// The bound store.
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    /// Resolve a wire-level type name through the chain.
    pub fn resolve(&self, type_name: &str) -> Result<&'static dyn TypeDescriptor> {
        self.inner
            .resolvers
            .iter()
            .find_map(|resolver| resolver(type_name))
            .ok_or_else(|| Error::UnknownType(type_name.to_owned()))
    }
}

/// The built-in resolver covering the exemplar types in [`crate::types`].
pub fn core_resolver(type_name: &str) -> Option<&'static dyn TypeDescriptor> {
    let core: [&'static dyn TypeDescriptor; 6] = [
        &types::string::STRING,
        &types::data::DATA,
        &types::array::ARRAY,
        &types::array::MUTABLE_ARRAY,
        &types::key_value::KEY_VALUE,
        &types::dictionary::DICTIONARY,
    ];
    core.into_iter().find(|ty| ty.name() == type_name)
}
