use std::fmt;

use strata_journal::JournalError;
use strata_path::PathError;
use strata_rights::RightsError;
use strata_store::DepotError;
use strata_types::{Genre, Identifier, Operation};
use thiserror::Error;

/// Errors raised by the access controller.
#[derive(Debug, Error)]
pub enum GearError {
    /// The identifier names no registered actor (stale or foreign handle).
    #[error("unknown actor: {0}")]
    UnknownActor(Identifier),

    /// The actor's scope no longer exists.
    #[error("unknown scope for {0}")]
    UnknownScope(Identifier),

    /// The requested closing operation would roll back shared changes.
    #[error("{actor} may not {operation}: modified while {attached} actors are attached")]
    InconsistentOperation {
        actor: Identifier,
        operation: Operation,
        attached: usize,
    },

    #[error("permission denied: {0}")]
    PermissionDenied(#[from] RightsError),

    /// Loading failed even after re-resolving the route from scratch.
    #[error("failed to load {route}: {reason}")]
    LoadFailure { route: String, reason: String },

    /// Handing a closed scope to the journal failed.
    #[error("shutdown of scope {tag} failed: {reason}")]
    ShutdownFailure { tag: u64, reason: String },

    #[error("identifier already registered: {0}")]
    AlreadyRegistered(Identifier),

    #[error("{0} is already attached")]
    AlreadyAttached(Identifier),

    #[error("{0} is not attached")]
    NotAttached(Identifier),

    /// A genre-specific call hit an object of another genre.
    #[error("expected a {expected}, found a {actual}")]
    GenreMismatch { expected: Genre, actual: Genre },

    #[error("entry already exists: {0}")]
    EntryExists(String),

    #[error("no such entry: {0}")]
    NoSuchEntry(String),

    /// A file range reaches past the largest size a file may have.
    #[error("range {offset}+{len} exceeds the file size limit")]
    OutOfRange { offset: u64, len: u64 },

    #[error(transparent)]
    Depot(#[from] DepotError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Journal(#[from] JournalError),
}

/// Coarse classification of a [`GearError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    UnknownActor,
    UnknownScope,
    InconsistentOperation,
    PermissionDenied,
    LoadFailure,
    ShutdownFailure,
    /// Registry or attachment bookkeeping violated; a bug if ever seen.
    Logic,
    /// A genre, directory entry or file range precondition did not hold.
    Invalid,
    /// A collaborator (depot, resolver, journal) failed.
    External,
}

impl GearError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownActor(_) => ErrorKind::UnknownActor,
            Self::UnknownScope(_) => ErrorKind::UnknownScope,
            Self::InconsistentOperation { .. } => ErrorKind::InconsistentOperation,
            Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Self::LoadFailure { .. } => ErrorKind::LoadFailure,
            Self::ShutdownFailure { .. } => ErrorKind::ShutdownFailure,
            Self::AlreadyRegistered(_) | Self::AlreadyAttached(_) | Self::NotAttached(_) => {
                ErrorKind::Logic
            }
            Self::GenreMismatch { .. }
            | Self::EntryExists(_)
            | Self::NoSuchEntry(_)
            | Self::OutOfRange { .. } => ErrorKind::Invalid,
            Self::Depot(_) | Self::Path(_) | Self::Journal(_) => ErrorKind::External,
        }
    }

    /// Failures that a fresh route resolution might cure.
    pub(crate) fn is_resolution(&self) -> bool {
        matches!(self, Self::Depot(_) | Self::Path(_))
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Convenience alias used throughout the gear crate.
pub type GearResult<T> = Result<T, GearError>;
