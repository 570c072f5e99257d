use strata_gear::automaton::link;
use strata_types::Identifier;

use crate::error::WallResult;
use crate::wall::Wall;

impl Wall {
    pub async fn bind(&self, id: Identifier, target: &str) -> WallResult<()> {
        Ok(self
            .gear()
            .mutate(id, |ctx| link::bind(ctx, target))
            .await?)
    }

    pub async fn resolve(&self, id: Identifier) -> WallResult<String> {
        Ok(self.gear().inspect(id, link::resolve).await?)
    }
}
