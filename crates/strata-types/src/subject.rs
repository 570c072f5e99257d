use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The principal on whose behalf objects are accessed.
///
/// A `Subject` is derived from a public key with BLAKE3, so the same key
/// always yields the same subject. Ownership and permission records on an
/// object block name subjects.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Subject {
    hash: [u8; 32],
}

impl Subject {
    /// Derive a subject from a 32-byte public key.
    pub fn from_public_key(key: &[u8; 32]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"strata-subject-v1:");
        hasher.update(key);
        Self {
            hash: *hasher.finalize().as_bytes(),
        }
    }

    /// Create an ephemeral (random) subject for tests and demos.
    pub fn ephemeral() -> Self {
        let mut key = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut key);
        Self::from_public_key(&key)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.hash
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        format!("sub:{}", hex::encode(&self.hash[..4]))
    }

    /// Parse from a hex string, with or without the `sub:` prefix.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let s = s.strip_prefix("sub:").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes);
        Ok(Self { hash })
    }
}

impl fmt::Debug for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subject({})", self.short_id())
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_id())
    }
}

/// Permission bits granted to a subject on an object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permissions {
    pub read: bool,
    pub write: bool,
}

impl Permissions {
    pub const NONE: Self = Self {
        read: false,
        write: false,
    };
    pub const READ: Self = Self {
        read: true,
        write: false,
    };
    pub const READ_WRITE: Self = Self {
        read: true,
        write: true,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_same_subject() {
        let key = [7u8; 32];
        assert_eq!(Subject::from_public_key(&key), Subject::from_public_key(&key));
    }

    #[test]
    fn ephemeral_subjects_differ() {
        assert_ne!(Subject::ephemeral(), Subject::ephemeral());
    }

    #[test]
    fn short_id_format() {
        let id = Subject::ephemeral().short_id();
        assert!(id.starts_with("sub:"));
        assert_eq!(id.len(), 12);
    }

    #[test]
    fn hex_roundtrip_with_prefix() {
        let subject = Subject::ephemeral();
        let prefixed = format!("sub:{}", subject.to_hex());
        assert_eq!(Subject::from_hex(&prefixed).unwrap(), subject);
    }

    #[test]
    fn permission_constants() {
        assert!(!Permissions::NONE.read);
        assert!(Permissions::READ.read && !Permissions::READ.write);
        assert!(Permissions::READ_WRITE.write);
        assert_eq!(Permissions::default(), Permissions::NONE);
    }
}
