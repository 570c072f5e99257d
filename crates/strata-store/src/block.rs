use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strata_types::{Address, ContentId, Genre, Permissions, Subject};

use crate::error::{DepotError, DepotResult};

/// Mutable, versioned metadata block of one filesystem object.
///
/// The block names its genre, owner and access records, and points at the
/// immutable content block holding the payload. Each push of a block at an
/// address must carry a strictly higher revision than the one before it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectBlock {
    pub genre: Genre,
    pub owner: Subject,
    /// Zero until the block has been pushed once.
    pub revision: u64,
    /// Access records granted to subjects other than the owner.
    pub permissions: Vec<(Subject, Permissions)>,
    /// `None` while the object has never stored any content.
    pub contents: Option<ContentId>,
    pub size: u64,
}

impl ObjectBlock {
    /// A fresh, never-pushed block.
    pub fn new(genre: Genre, owner: Subject) -> Self {
        Self {
            genre,
            owner,
            revision: 0,
            permissions: Vec::new(),
            contents: None,
            size: 0,
        }
    }

    /// Permissions recorded for `subject`. The owner implicitly holds all.
    pub fn permissions_of(&self, subject: &Subject) -> Permissions {
        if *subject == self.owner {
            return Permissions::READ_WRITE;
        }
        self.permissions
            .iter()
            .find(|(s, _)| s == subject)
            .map(|(_, p)| *p)
            .unwrap_or(Permissions::NONE)
    }

    /// Record (or replace) the permissions granted to `subject`.
    pub fn grant(&mut self, subject: Subject, permissions: Permissions) {
        match self.permissions.iter_mut().find(|(s, _)| *s == subject) {
            Some(entry) => entry.1 = permissions,
            None => self.permissions.push((subject, permissions)),
        }
    }

    pub fn encode(&self) -> DepotResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| DepotError::Serialization(e.to_string()))
    }

    pub fn decode(data: &[u8]) -> DepotResult<Self> {
        bincode::deserialize(data).map_err(|e| DepotError::Serialization(e.to_string()))
    }
}

/// Immutable payload of an object, addressed by its content hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contents {
    /// Raw file bytes.
    File(Vec<u8>),
    /// Directory entries, name to object address, in name order.
    Directory(BTreeMap<String, Address>),
    /// Target route of a symbolic link.
    Link(String),
}

impl Contents {
    /// Empty payload for a freshly created object of `genre`.
    pub fn empty(genre: Genre) -> Self {
        match genre {
            Genre::File => Self::File(Vec::new()),
            Genre::Directory => Self::Directory(BTreeMap::new()),
            Genre::Link => Self::Link(String::new()),
        }
    }

    pub fn genre(&self) -> Genre {
        match self {
            Self::File(_) => Genre::File,
            Self::Directory(_) => Genre::Directory,
            Self::Link(_) => Genre::Link,
        }
    }

    /// Logical size: byte length, entry count, or target length.
    pub fn size(&self) -> u64 {
        match self {
            Self::File(data) => data.len() as u64,
            Self::Directory(entries) => entries.len() as u64,
            Self::Link(target) => target.len() as u64,
        }
    }

    pub fn encode(&self) -> DepotResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| DepotError::Serialization(e.to_string()))
    }

    pub fn decode(data: &[u8]) -> DepotResult<Self> {
        bincode::deserialize(data).map_err(|e| DepotError::Serialization(e.to_string()))
    }

    /// Content address of the encoded payload.
    pub fn id(&self) -> DepotResult<ContentId> {
        Ok(ContentId::derive(&self.encode()?))
    }
}
