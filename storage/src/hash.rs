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

//! Object identity: a fixed-width digest and the sink that computes it.
//!
//! An [`ObjectHash`] is the digest of an object's canonical reference-mode
//! serialization. Because that serialization names children by *their*
//! hashes, a parent's hash is a function of its own structure and its
//! children's hashes, giving O(1) equality on arbitrarily large subtrees.

use crate::DefaultHasher;
use crate::error::{Error, Result};
use crypto::digest::Digest;
use hex::ToHex;
use std::fmt::{self, Debug, Display};
use std::io;
use std::str::FromStr;

/// Width of the raw digest in bytes.
pub const HASH_BYTES: usize = 32;

/// Width of the hash in its fixed-width hex text form, as it appears on the
/// wire and in store keys.
pub const HASH_HEX_LEN: usize = HASH_BYTES * 2;

/// The digest identifying one object state.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectHash([u8; HASH_BYTES]);

impl ObjectHash {
    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_BYTES] {
        &self.0
    }

    /// The fixed-width lowercase hex form used on the wire.
    pub fn to_hex(&self) -> String {
        self.0.encode_hex()
    }

    /// Parse the fixed-width hex form, enforcing exact width and alphabet.
    pub fn from_hex(text: &str) -> Result<Self> {
        if text.len() != HASH_HEX_LEN {
            return Err(Error::corrupt(format!(
                "hash must be {HASH_HEX_LEN} hex chars, got {}",
                text.len()
            )));
        }
        let raw = hex::decode(text)
            .map_err(|err| Error::corrupt(format!("hash is not hex: {err}")))?;
        let mut bytes = [0u8; HASH_BYTES];
        bytes.copy_from_slice(&raw);
        Ok(ObjectHash(bytes))
    }
}

impl Debug for ObjectHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Display for ObjectHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for ObjectHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ObjectHash::from_hex(s)
    }
}

/// An [`io::Write`] sink that streams into the digest. Serializing an object
/// into one of these and finalizing yields the object's hash without any
/// backing buffer.
#[derive(Default)]
pub struct HashWriter {
    hasher: DefaultHasher,
}

impl HashWriter {
    /// Consume the sink, producing the digest of everything written.
    pub fn finalize(self) -> ObjectHash {
        let digest = self.hasher.finalize();
        let mut bytes = [0u8; HASH_BYTES];
        bytes.copy_from_slice(&digest);
        ObjectHash(bytes)
    }
}

impl io::Write for HashWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.hasher.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn hex_round_trip() {
        let mut sink = HashWriter::default();
        sink.write_all(b"abc").unwrap();
        let hash = sink.finalize();
        let text = hash.to_hex();
        assert_eq!(text.len(), HASH_HEX_LEN);
        assert_eq!(ObjectHash::from_hex(&text).unwrap(), hash);
    }

    #[test]
    fn wrong_width_rejected() {
        assert!(ObjectHash::from_hex("abcd").is_err());
        let long = "0".repeat(HASH_HEX_LEN + 2);
        assert!(ObjectHash::from_hex(&long).is_err());
    }

    #[test]
    fn non_hex_rejected() {
        let bogus = "z".repeat(HASH_HEX_LEN);
        assert!(ObjectHash::from_hex(&bogus).is_err());
    }

    #[test]
    fn matches_direct_digest() {
        let mut sink = HashWriter::default();
        sink.write_all(b"hello").unwrap();
        sink.write_all(b" world").unwrap();
        let streamed = sink.finalize();
        let direct = DefaultHasher::digest(b"hello world");
        assert_eq!(streamed.as_bytes()[..], direct[..]);
    }
}
