use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Shared shape of the 32-byte digest identifiers.
macro_rules! digest_id {
    ($name:ident, $domain:literal) => {
        impl $name {
            /// Domain tag prepended to every hash computed for this type.
            pub const DOMAIN: &'static str = $domain;

            /// Hash raw bytes with domain separation.
            pub fn derive(data: &[u8]) -> Self {
                let mut hasher = blake3::Hasher::new();
                hasher.update(Self::DOMAIN.as_bytes());
                hasher.update(b":");
                hasher.update(data);
                Self(*hasher.finalize().as_bytes())
            }

            /// Create from a pre-computed hash.
            pub const fn from_hash(hash: [u8; 32]) -> Self {
                Self(hash)
            }

            /// The null value (all zeros).
            pub const fn null() -> Self {
                Self([0u8; 32])
            }

            /// Returns `true` if this is the null value.
            pub fn is_null(&self) -> bool {
                self.0 == [0u8; 32]
            }

            /// The raw 32-byte hash.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Hex-encoded string representation.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Short hex representation (first 8 characters).
            pub fn short_hex(&self) -> String {
                hex::encode(&self.0[..4])
            }

            /// Parse from a 64-character hex string.
            pub fn from_hex(s: &str) -> Result<Self, TypeError> {
                let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
                if bytes.len() != 32 {
                    return Err(TypeError::InvalidLength {
                        expected: 32,
                        actual: bytes.len(),
                    });
                }
                let mut arr = [0u8; 32];
                arr.copy_from_slice(&bytes);
                Ok(Self(arr))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.short_hex())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }
    };
}

/// Stable address of a mutable object block.
///
/// An object keeps its address for its whole life; every store produces a
/// new revision at the same address. Addresses are minted once, when the
/// object is created, from random seed material.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address([u8; 32]);

digest_id!(Address, "strata-address-v1");

impl Address {
    /// Mint a fresh, random address for a newly created object.
    pub fn generate() -> Self {
        let mut seed = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut seed);
        Self::derive(&seed)
    }
}

/// Content-addressed identifier of an immutable content block.
///
/// Identical content always produces the same `ContentId`, so content
/// blocks are deduplicated and verifiable on read.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentId([u8; 32]);

digest_id!(ContentId, "strata-content-v1");
