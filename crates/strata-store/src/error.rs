use strata_types::{Address, ContentId};

/// Errors from depot operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DepotError {
    /// No object block has ever been pushed at this address, or it was wiped.
    #[error("object not found: {0:?}")]
    NotFound(Address),

    /// The object exists but not at the requested revision.
    #[error("revision #{revision} not found for {address:?}")]
    RevisionNotFound { address: Address, revision: u64 },

    /// The requested content block does not exist.
    #[error("content not found: {0:?}")]
    ContentNotFound(ContentId),

    /// A push did not advance the object's revision.
    #[error("stale revision for {address:?}: latest #{latest}, attempted #{attempted}")]
    StaleRevision {
        address: Address,
        latest: u64,
        attempted: u64,
    },

    /// Content hash mismatch on read (data corruption).
    #[error("hash mismatch for {id:?}: computed {computed:?}")]
    HashMismatch { id: ContentId, computed: ContentId },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for depot operations.
pub type DepotResult<T> = Result<T, DepotError>;
