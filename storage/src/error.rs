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

//! Error surface of the object engine.

use thiserror::Error;

/// Everything that can go wrong in the engine.
#[derive(Debug, Error)]
pub enum Error {
    /// An immutable container was asked to include a mutable element. The
    /// operation aborts without partial state.
    #[error("immutable container `{0}` was given a mutable element")]
    ImmutabilityViolated(String),

    /// Deserialization encountered a type name no resolver recognizes. Fatal
    /// for the enclosing decode.
    #[error("no resolver recognizes type name `{0}`")]
    UnknownType(String),

    /// The structured decoder produced a tree that violates the expected
    /// shape. Fatal for the enclosing decode.
    #[error("malformed structured encoding: {0}")]
    CorruptEncoding(String),

    /// An object without a resident payload has no context or hash to page
    /// it back in with.
    #[error("object of type `{0}` has no resident payload and no way to page it in")]
    MissingPayload(String),

    /// A structured decode was attempted on an object with no context bound,
    /// so child type names cannot be resolved.
    #[error("object of type `{0}` is not bound to a context")]
    MissingContext(String),

    /// A type descriptor was asked for a hook it does not provide.
    #[error("type `{type_name}` does not implement `{operation}`")]
    UnsupportedOperation {
        /// Name of the offending descriptor.
        type_name: String,
        /// The missing hook.
        operation: &'static str,
    },

    /// A store stream failed. Partial writes leave no memory-side change;
    /// the persisted flag is set only after a successful commit.
    #[error("store i/o: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn unsupported(type_name: &str, operation: &'static str) -> Self {
        Error::UnsupportedOperation {
            type_name: type_name.to_owned(),
            operation,
        }
    }

    pub(crate) fn corrupt(message: impl Into<String>) -> Self {
        Error::CorruptEncoding(message.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        match err.io_error_kind() {
            Some(kind) => Error::Io(kind.into()),
            None => Error::CorruptEncoding(err.to_string()),
        }
    }
}

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;
