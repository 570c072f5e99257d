use strata_path::validate_component;
use strata_types::Address;

use crate::context::Context;
use crate::error::{GearError, GearResult};

pub fn add(context: &mut Context, name: &str, address: Address) -> GearResult<()> {
    validate_component(name)?;
    let entries = context.directory_mut()?;
    if entries.contains_key(name) {
        return Err(GearError::EntryExists(name.to_string()));
    }
    entries.insert(name.to_string(), address);
    context.touch();
    Ok(())
}

pub fn lookup(context: &Context, name: &str) -> GearResult<Option<Address>> {
    Ok(context.directory()?.get(name).copied())
}

/// List up to `size` entries in name order, starting at `index`.
pub fn consult(context: &Context, index: usize, size: usize) -> GearResult<Vec<(String, Address)>> {
    Ok(context
        .directory()?
        .iter()
        .skip(index)
        .take(size)
        .map(|(name, address)| (name.clone(), *address))
        .collect())
}

/// Remove an entry, returning the address it named.
pub fn remove(context: &mut Context, name: &str) -> GearResult<Address> {
    let address = context
        .directory_mut()?
        .remove(name)
        .ok_or_else(|| GearError::NoSuchEntry(name.to_string()))?;
    context.touch();
    Ok(address)
}

pub fn rename(context: &mut Context, from: &str, to: &str) -> GearResult<()> {
    validate_component(to)?;
    let entries = context.directory_mut()?;
    if !entries.contains_key(from) {
        return Err(GearError::NoSuchEntry(from.to_string()));
    }
    if from == to {
        return Ok(());
    }
    if entries.contains_key(to) {
        return Err(GearError::EntryExists(to.to_string()));
    }
    if let Some(address) = entries.remove(from) {
        entries.insert(to.to_string(), address);
    }
    context.touch();
    Ok(())
}
