use std::sync::Arc;

use strata_store::{Contents, Depot};
use strata_types::{Address, Genre, Location};
use tracing::{debug, info};

use crate::error::{PathError, Result};
use crate::route::Route;
use crate::shrub::{Shrub, ShrubConfig};

/// Resolves routes to locations by walking directory blocks from the root.
///
/// Every intermediate resolution is remembered in the [`Shrub`]. Cached
/// entries can go stale when the tree changes underneath; callers evict the
/// routes they know changed, and clear the whole cache when a pull at a
/// cached location fails.
pub struct Resolver {
    depot: Arc<dyn Depot>,
    root: Address,
    shrub: Shrub,
}

impl Resolver {
    pub fn new(depot: Arc<dyn Depot>, root: Address, config: &ShrubConfig) -> Self {
        Self {
            depot,
            root,
            shrub: Shrub::new(config),
        }
    }

    pub fn root(&self) -> Address {
        self.root
    }

    pub fn depot(&self) -> &Arc<dyn Depot> {
        &self.depot
    }

    pub fn shrub(&self) -> &Shrub {
        &self.shrub
    }

    /// Resolve `route` to the latest location of the object it names.
    pub async fn resolve(&self, route: &Route) -> Result<Location> {
        if route.is_root() {
            return Ok(Location::latest(self.root));
        }
        if let Some(location) = self.shrub.get(route) {
            return Ok(location);
        }

        debug!(route = %route, "resolving route");
        let mut current = Location::latest(self.root);
        let mut walked = Route::root();
        for component in route.components() {
            let entries = self.entries(&current, &walked).await?;
            walked = walked.child(component)?;
            let address = entries
                .get(component)
                .copied()
                .ok_or_else(|| PathError::NotFound(walked.to_string()))?;
            current = Location::latest(address);
            self.shrub.put(walked.clone(), current);
        }
        Ok(current)
    }

    /// Forget the cached resolutions of `route` and everything beneath it.
    pub fn evict(&self, route: &Route) -> usize {
        self.shrub.evict(route)
    }

    /// Forget every cached resolution.
    pub fn clear(&self) {
        info!(cached = self.shrub.len(), "clearing route cache");
        self.shrub.clear();
    }

    async fn entries(
        &self,
        location: &Location,
        walked: &Route,
    ) -> Result<std::collections::BTreeMap<String, Address>> {
        let block = self.depot.pull_object(location).await?;
        if block.genre != Genre::Directory {
            return Err(PathError::NotADirectory(walked.to_string()));
        }
        let Some(id) = block.contents else {
            return Ok(Default::default());
        };
        match self.depot.pull_contents(&id).await? {
            Contents::Directory(entries) => Ok(entries),
            _ => Err(PathError::NotADirectory(walked.to_string())),
        }
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("root", &self.root)
            .field("shrub", &self.shrub)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use strata_store::{InMemoryDepot, ObjectBlock};
    use strata_types::Subject;

    async fn put_object(depot: &InMemoryDepot, genre: Genre, contents: Contents) -> Address {
        let address = Address::generate();
        let mut block = ObjectBlock::new(genre, Subject::ephemeral());
        block.revision = 1;
        block.contents = Some(depot.push_contents(&contents).await.unwrap());
        depot.push_object(address, block).await.unwrap();
        address
    }

    /// Builds `/d/x` (a file) under a fresh root and returns (resolver, d, x).
    async fn tree() -> (Resolver, Arc<InMemoryDepot>, Address, Address) {
        let depot = Arc::new(InMemoryDepot::new());
        let x = put_object(&depot, Genre::File, Contents::File(b"data".to_vec())).await;
        let d = put_object(
            &depot,
            Genre::Directory,
            Contents::Directory(BTreeMap::from([("x".to_string(), x)])),
        )
        .await;
        let root = put_object(
            &depot,
            Genre::Directory,
            Contents::Directory(BTreeMap::from([("d".to_string(), d)])),
        )
        .await;
        let resolver = Resolver::new(depot.clone(), root, &ShrubConfig::default());
        (resolver, depot, d, x)
    }

    #[tokio::test]
    async fn resolves_root_without_depot_access() {
        let depot = Arc::new(InMemoryDepot::new());
        let root = Address::generate();
        let resolver = Resolver::new(depot, root, &ShrubConfig::default());
        let location = resolver.resolve(&Route::root()).await.unwrap();
        assert_eq!(location, Location::latest(root));
    }

    #[tokio::test]
    async fn resolves_nested_route_and_caches_prefixes() {
        let (resolver, _depot, d, x) = tree().await;
        let location = resolver.resolve(&Route::parse("/d/x").unwrap()).await.unwrap();
        assert_eq!(location, Location::latest(x));
        assert_eq!(
            resolver.shrub().get(&Route::parse("/d").unwrap()),
            Some(Location::latest(d))
        );
    }

    #[tokio::test]
    async fn missing_entry_is_not_found() {
        let (resolver, _depot, _, _) = tree().await;
        let err = resolver
            .resolve(&Route::parse("/d/missing").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, PathError::NotFound(ref r) if r == "/d/missing"));
    }

    #[tokio::test]
    async fn walking_through_a_file_fails() {
        let (resolver, _depot, _, _) = tree().await;
        let err = resolver
            .resolve(&Route::parse("/d/x/y").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, PathError::NotADirectory(ref r) if r == "/d/x"));
    }

    #[tokio::test]
    async fn stale_cache_is_served_until_cleared() {
        let (resolver, depot, _, x) = tree().await;
        let route = Route::parse("/d/x").unwrap();
        resolver.resolve(&route).await.unwrap();

        depot.wipe_object(&x).await.unwrap();
        // Served from cache even though the object is gone.
        assert_eq!(resolver.resolve(&route).await.unwrap(), Location::latest(x));

        resolver.clear();
        assert!(resolver.shrub().is_empty());
        assert_eq!(resolver.resolve(&route).await.unwrap(), Location::latest(x));
    }

    #[tokio::test]
    async fn evict_forces_fresh_walk() {
        let (resolver, depot, d, _) = tree().await;
        let route = Route::parse("/d/x").unwrap();
        resolver.resolve(&route).await.unwrap();
        depot.wipe_object(&d).await.unwrap();

        assert_eq!(resolver.evict(&Route::parse("/d").unwrap()), 2);
        let err = resolver.resolve(&route).await.unwrap_err();
        assert!(matches!(err, PathError::Depot(_)));
    }
}
