use strata_gear::automaton::file;
use strata_types::Identifier;

use crate::error::WallResult;
use crate::wall::Wall;

impl Wall {
    /// Write `bytes` at `offset`, zero-filling any gap past the end.
    pub async fn write(&self, id: Identifier, offset: u64, bytes: &[u8]) -> WallResult<()> {
        Ok(self
            .gear()
            .mutate(id, |ctx| file::write(ctx, offset, bytes))
            .await?)
    }

    /// Read up to `size` bytes from `offset`; short at end of file.
    pub async fn read(&self, id: Identifier, offset: u64, size: u64) -> WallResult<Vec<u8>> {
        Ok(self
            .gear()
            .inspect(id, |ctx| file::read(ctx, offset, size))
            .await?)
    }

    /// Truncate or zero-extend to `size` bytes.
    pub async fn adjust(&self, id: Identifier, size: u64) -> WallResult<()> {
        Ok(self
            .gear()
            .mutate(id, |ctx| file::adjust(ctx, size))
            .await?)
    }
}
