use serde::{Deserialize, Serialize};
use strata_store::{Contents, ObjectBlock};
use strata_types::{Address, ContentId};

/// A single depot mutation produced by closing an object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Store an immutable content block.
    PushContents { id: ContentId, contents: Contents },
    /// Publish a new object block revision.
    PushObject { address: Address, block: ObjectBlock },
    /// Remove an object entirely.
    Wipe { address: Address },
}

impl Action {
    pub fn is_wipe(&self) -> bool {
        matches!(self, Self::Wipe { .. })
    }
}

/// Ordered list of depot mutations handed to the journal as a unit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    actions: Vec<Action>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    /// Drop every action recorded after the first `len`.
    pub fn truncate(&mut self, len: usize) {
        self.actions.truncate(len);
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    /// Number of push actions (contents and objects).
    pub fn pushes(&self) -> usize {
        self.actions.iter().filter(|a| !a.is_wipe()).count()
    }

    pub fn wipes(&self) -> usize {
        self.actions.iter().filter(|a| a.is_wipe()).count()
    }
}
