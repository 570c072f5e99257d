use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strata_journal::Transcript;
use strata_store::{Contents, ObjectBlock};
use strata_types::{Address, Genre, Operation, Subject};

use crate::error::{GearError, GearResult};

/// Persistence state of a [`Context`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContextState {
    /// Freshly created, never stored.
    Created,
    /// Pulled from the depot, unmodified.
    Loaded,
    /// Modified in memory.
    Updated,
    Discarded,
    Stored,
    Destroyed,
}

impl ContextState {
    /// Terminal states seal the scope for journal handoff.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Discarded | Self::Stored | Self::Destroyed)
    }
}

/// In-memory content and persistence state of one object.
///
/// The payload variant is fixed when the context is first materialized from
/// the object's genre and never changes afterwards.
#[derive(Clone, Debug)]
pub struct Context {
    address: Address,
    block: ObjectBlock,
    contents: Contents,
    pub(crate) state: ContextState,
    pub(crate) operation: Option<Operation>,
    pub(crate) transcript: Transcript,
    dirty: bool,
}

impl Context {
    pub(crate) fn created(address: Address, block: ObjectBlock) -> Self {
        let contents = Contents::empty(block.genre);
        Self {
            address,
            block,
            contents,
            state: ContextState::Created,
            operation: None,
            transcript: Transcript::new(),
            // A created object must reach the depot even if never written.
            dirty: true,
        }
    }

    pub(crate) fn loaded(address: Address, block: ObjectBlock, contents: Contents) -> Self {
        Self {
            address,
            block,
            contents,
            state: ContextState::Loaded,
            operation: None,
            transcript: Transcript::new(),
            dirty: false,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn block(&self) -> &ObjectBlock {
        &self.block
    }

    pub fn genre(&self) -> Genre {
        self.block.genre
    }

    pub fn contents(&self) -> &Contents {
        &self.contents
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    /// Closing operation folded so far, if any.
    pub fn operation(&self) -> Option<Operation> {
        self.operation
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record an in-memory modification.
    pub(crate) fn touch(&mut self) {
        self.dirty = true;
        if !self.state.is_terminal() {
            self.state = ContextState::Updated;
        }
    }

    fn mismatch(&self, expected: Genre) -> GearError {
        GearError::GenreMismatch {
            expected,
            actual: self.genre(),
        }
    }

    pub fn file(&self) -> GearResult<&Vec<u8>> {
        match &self.contents {
            Contents::File(data) => Ok(data),
            _ => Err(self.mismatch(Genre::File)),
        }
    }

    pub(crate) fn file_mut(&mut self) -> GearResult<&mut Vec<u8>> {
        let actual = self.genre();
        match &mut self.contents {
            Contents::File(data) => Ok(data),
            _ => Err(GearError::GenreMismatch {
                expected: Genre::File,
                actual,
            }),
        }
    }

    pub fn directory(&self) -> GearResult<&BTreeMap<String, Address>> {
        match &self.contents {
            Contents::Directory(entries) => Ok(entries),
            _ => Err(self.mismatch(Genre::Directory)),
        }
    }

    pub(crate) fn directory_mut(&mut self) -> GearResult<&mut BTreeMap<String, Address>> {
        let actual = self.genre();
        match &mut self.contents {
            Contents::Directory(entries) => Ok(entries),
            _ => Err(GearError::GenreMismatch {
                expected: Genre::Directory,
                actual,
            }),
        }
    }

    pub fn link(&self) -> GearResult<&str> {
        match &self.contents {
            Contents::Link(target) => Ok(target),
            _ => Err(self.mismatch(Genre::Link)),
        }
    }

    pub(crate) fn link_mut(&mut self) -> GearResult<&mut String> {
        let actual = self.genre();
        match &mut self.contents {
            Contents::Link(target) => Ok(target),
            _ => Err(GearError::GenreMismatch {
                expected: Genre::Link,
                actual,
            }),
        }
    }
}

/// Metadata snapshot returned by `information`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Information {
    pub genre: Genre,
    pub address: Address,
    /// Revision last pulled or stored; zero for a never-stored object.
    pub revision: u64,
    /// Bytes for files, entries for directories, target length for links.
    pub size: u64,
    pub owner: Subject,
    pub state: ContextState,
}

impl From<&Context> for Information {
    fn from(context: &Context) -> Self {
        Self {
            genre: context.genre(),
            address: context.address,
            revision: context.block.revision,
            size: context.contents.size(),
            owner: context.block.owner,
            state: context.state,
        }
    }
}
