use crate::context::Context;
use crate::error::{GearError, GearResult};

/// Largest size a file may reach through `write` or `adjust`.
pub const MAX_FILE_SIZE: u64 = 1 << 32;

/// End of `offset..offset + len`, if it stays within [`MAX_FILE_SIZE`].
fn bounded_end(offset: u64, len: u64) -> GearResult<usize> {
    offset
        .checked_add(len)
        .filter(|end| *end <= MAX_FILE_SIZE)
        .and_then(|end| usize::try_from(end).ok())
        .ok_or(GearError::OutOfRange { offset, len })
}

/// Write `bytes` at `offset`, zero-filling any gap past the current end.
///
/// Fails with `OutOfRange`, leaving the file untouched, if the write would
/// grow it past [`MAX_FILE_SIZE`].
pub fn write(context: &mut Context, offset: u64, bytes: &[u8]) -> GearResult<()> {
    let end = bounded_end(offset, bytes.len() as u64)?;
    let start = end - bytes.len();
    let data = context.file_mut()?;
    if data.len() < end {
        data.resize(end, 0);
    }
    data[start..end].copy_from_slice(bytes);
    context.touch();
    Ok(())
}

/// Read up to `size` bytes from `offset`. Reads past the end are short.
pub fn read(context: &Context, offset: u64, size: u64) -> GearResult<Vec<u8>> {
    let data = context.file()?;
    let start = usize::try_from(offset).unwrap_or(usize::MAX).min(data.len());
    let size = usize::try_from(size).unwrap_or(usize::MAX);
    let end = start.saturating_add(size).min(data.len());
    Ok(data[start..end].to_vec())
}

/// Truncate or zero-extend the file to `size` bytes.
pub fn adjust(context: &mut Context, size: u64) -> GearResult<()> {
    let size = bounded_end(0, size)?;
    context.file_mut()?.resize(size, 0);
    context.touch();
    Ok(())
}
