use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use strata_types::{Address, ContentId, Genre, Location, Revision, Subject};
use tracing::debug;

use crate::block::{Contents, ObjectBlock};
use crate::depot::Depot;
use crate::error::{DepotError, DepotResult};

/// In-memory, HashMap-based depot.
///
/// Intended for tests and embedding. Every pushed revision of an object is
/// retained so exact-revision pulls keep working after later pushes. Content
/// blocks are held encoded and verified against their hash on every pull.
pub struct InMemoryDepot {
    objects: RwLock<HashMap<Address, Vec<ObjectBlock>>>,
    contents: RwLock<HashMap<ContentId, Vec<u8>>>,
}

impl InMemoryDepot {
    /// Create a new empty depot.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            contents: RwLock::new(HashMap::new()),
        }
    }

    /// Seed the depot with an empty root directory owned by `owner`.
    pub fn bootstrap_root(&self, owner: Subject) -> DepotResult<Address> {
        let address = Address::generate();
        let contents = Contents::empty(Genre::Directory);
        let id = self.insert_contents(&contents)?;
        let mut block = ObjectBlock::new(Genre::Directory, owner);
        block.revision = 1;
        block.contents = Some(id);
        self.insert_object(address, block)?;
        debug!(root = %address.short_hex(), "bootstrapped root directory");
        Ok(address)
    }

    /// Number of live object addresses.
    pub fn object_count(&self) -> usize {
        self.objects.read().expect("objects lock poisoned").len()
    }

    /// Number of stored content blocks.
    pub fn contents_count(&self) -> usize {
        self.contents.read().expect("contents lock poisoned").len()
    }

    /// Latest revision number held at `address`, if any.
    pub fn latest_revision(&self, address: &Address) -> Option<u64> {
        self.objects
            .read()
            .expect("objects lock poisoned")
            .get(address)
            .and_then(|history| history.last())
            .map(|block| block.revision)
    }

    /// Overwrite the stored bytes of a content block. Test hook for
    /// exercising corruption detection.
    #[doc(hidden)]
    pub fn corrupt_contents(&self, id: &ContentId, data: Vec<u8>) {
        self.contents
            .write()
            .expect("contents lock poisoned")
            .insert(*id, data);
    }

    fn insert_object(&self, address: Address, block: ObjectBlock) -> DepotResult<()> {
        let mut map = self.objects.write().expect("objects lock poisoned");
        let history = map.entry(address).or_default();
        if let Some(latest) = history.last() {
            if block.revision <= latest.revision {
                return Err(DepotError::StaleRevision {
                    address,
                    latest: latest.revision,
                    attempted: block.revision,
                });
            }
        }
        history.push(block);
        Ok(())
    }

    fn insert_contents(&self, contents: &Contents) -> DepotResult<ContentId> {
        let data = contents.encode()?;
        let id = ContentId::derive(&data);
        let mut map = self.contents.write().expect("contents lock poisoned");
        // Idempotent: the same id always maps to the same bytes.
        map.entry(id).or_insert(data);
        Ok(id)
    }
}

impl Default for InMemoryDepot {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Depot for InMemoryDepot {
    async fn pull_object(&self, location: &Location) -> DepotResult<ObjectBlock> {
        let map = self.objects.read().expect("objects lock poisoned");
        let history = map
            .get(&location.address)
            .ok_or(DepotError::NotFound(location.address))?;
        let found = match location.revision {
            Revision::Any => history.last(),
            Revision::Exact(n) => history.iter().find(|block| block.revision == n),
        };
        match (found, location.revision) {
            (Some(block), _) => Ok(block.clone()),
            (None, Revision::Exact(revision)) => Err(DepotError::RevisionNotFound {
                address: location.address,
                revision,
            }),
            (None, Revision::Any) => Err(DepotError::NotFound(location.address)),
        }
    }

    async fn push_object(&self, address: Address, block: ObjectBlock) -> DepotResult<()> {
        let revision = block.revision;
        self.insert_object(address, block)?;
        debug!(address = %address.short_hex(), revision, "pushed object block");
        Ok(())
    }

    async fn wipe_object(&self, address: &Address) -> DepotResult<bool> {
        let mut map = self.objects.write().expect("objects lock poisoned");
        let existed = map.remove(address).is_some();
        debug!(address = %address.short_hex(), existed, "wiped object block");
        Ok(existed)
    }

    async fn pull_contents(&self, id: &ContentId) -> DepotResult<Contents> {
        let data = {
            let map = self.contents.read().expect("contents lock poisoned");
            map.get(id).cloned().ok_or(DepotError::ContentNotFound(*id))?
        };
        let computed = ContentId::derive(&data);
        if computed != *id {
            return Err(DepotError::HashMismatch { id: *id, computed });
        }
        Contents::decode(&data)
    }

    async fn push_contents(&self, contents: &Contents) -> DepotResult<ContentId> {
        self.insert_contents(contents)
    }
}

impl std::fmt::Debug for InMemoryDepot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDepot")
            .field("object_count", &self.object_count())
            .field("contents_count", &self.contents_count())
            .finish()
    }
}
