use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, copyable handle naming an actor.
///
/// Handles carry a generation so that a stale handle whose slot has been
/// reused never resolves to the new occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identifier {
    index: u32,
    generation: u32,
}

impl Identifier {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor:{}v{}", self.index, self.generation)
    }
}
