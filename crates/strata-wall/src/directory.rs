use strata_gear::automaton::directory;
use strata_path::Route;
use strata_types::{Address, Identifier};
use tracing::debug;

use crate::error::WallResult;
use crate::wall::Wall;

impl Wall {
    /// Enter the object opened as `child` into directory `parent` as `name`.
    pub async fn add(&self, parent: Identifier, name: &str, child: Identifier) -> WallResult<()> {
        let address = self.gear().information(child).await?.address;
        self.gear()
            .mutate(parent, |ctx| directory::add(ctx, name, address))
            .await?;
        Ok(())
    }

    pub async fn lookup(&self, id: Identifier, name: &str) -> WallResult<Option<Address>> {
        Ok(self
            .gear()
            .inspect(id, |ctx| directory::lookup(ctx, name))
            .await?)
    }

    /// List up to `size` entries starting at `index`, in name order.
    pub async fn consult(
        &self,
        id: Identifier,
        index: usize,
        size: usize,
    ) -> WallResult<Vec<(String, Address)>> {
        Ok(self
            .gear()
            .inspect(id, |ctx| directory::consult(ctx, index, size))
            .await?)
    }

    /// Remove entry `name` and forget any cached resolution beneath it.
    pub async fn remove(&self, id: Identifier, name: &str) -> WallResult<Address> {
        let address = self
            .gear()
            .mutate(id, |ctx| directory::remove(ctx, name))
            .await?;
        if let Some(route) = self.parent_route(id)? {
            let removed = route.child(name)?;
            let evicted = self.gear().resolver().evict(&removed);
            let unbound = self.gear().table().unbind(&removed);
            debug!(route = %removed, evicted, unbound, "entry removed");
        }
        Ok(address)
    }

    /// Rename entry `from` to `to`, moving the routes of open objects
    /// beneath it.
    pub async fn rename(&self, id: Identifier, from: &str, to: &str) -> WallResult<()> {
        self.gear()
            .mutate(id, |ctx| directory::rename(ctx, from, to))
            .await?;
        if let Some(route) = self.parent_route(id)? {
            let (old, new) = (route.child(from)?, route.child(to)?);
            self.gear().resolver().evict(&old);
            self.gear().resolver().evict(&new);
            let moved = self.gear().table().update(&old, &new);
            debug!(from = %old, to = %new, moved, "entry renamed");
        }
        Ok(())
    }

    fn parent_route(&self, id: Identifier) -> WallResult<Option<Route>> {
        Ok(self.gear().scope_of(id)?.route())
    }
}
