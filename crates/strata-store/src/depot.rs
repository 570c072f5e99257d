use async_trait::async_trait;
use strata_types::{Address, ContentId, Location};

use crate::block::{Contents, ObjectBlock};
use crate::error::DepotResult;

/// Remote block store holding object and content blocks.
///
/// Object blocks are mutable and versioned by address; content blocks are
/// immutable and addressed by hash. Every call may suspend on network I/O.
#[async_trait]
pub trait Depot: Send + Sync {
    /// Fetch the object block at `location`.
    async fn pull_object(&self, location: &Location) -> DepotResult<ObjectBlock>;

    /// Publish a new revision of the object block at `address`.
    ///
    /// Fails with `StaleRevision` if `block.revision` does not advance past
    /// the latest revision already held.
    async fn push_object(&self, address: Address, block: ObjectBlock) -> DepotResult<()>;

    /// Remove every revision at `address`. Returns `true` if it existed.
    async fn wipe_object(&self, address: &Address) -> DepotResult<bool>;

    /// Fetch and verify a content block.
    async fn pull_contents(&self, id: &ContentId) -> DepotResult<Contents>;

    /// Store a content block and return its content address.
    ///
    /// Idempotent: pushing identical contents twice yields the same id.
    async fn push_contents(&self, contents: &Contents) -> DepotResult<ContentId>;
}
