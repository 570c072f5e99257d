use std::fmt;

use serde::{Deserialize, Serialize};

/// A closing operation requested by an actor.
///
/// Variants are declared in precedence order so that `Ord` reflects it:
/// when several actors close the same object, the strongest request wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operation {
    /// Drop local modifications.
    Discard,
    /// Persist modifications.
    Store,
    /// Remove the object entirely.
    Destroy,
}

impl Operation {
    /// Fold `requested` into the currently recorded operation.
    ///
    /// An unset operation takes the request. A set operation is replaced
    /// only by a stronger one.
    pub fn fold(current: Option<Self>, requested: Self) -> Self {
        match current {
            Some(existing) if existing >= requested => existing,
            _ => requested,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discard => write!(f, "discard"),
            Self::Store => write!(f, "store"),
            Self::Destroy => write!(f, "destroy"),
        }
    }
}
