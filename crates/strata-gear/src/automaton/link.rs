use crate::context::Context;
use crate::error::GearResult;

/// Point the link at `target`.
pub fn bind(context: &mut Context, target: &str) -> GearResult<()> {
    let current = context.link_mut()?;
    current.clear();
    current.push_str(target);
    context.touch();
    Ok(())
}

pub fn resolve(context: &Context) -> GearResult<String> {
    Ok(context.link()?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_store::ObjectBlock;
    use strata_types::{Address, Genre, Subject};

    #[test]
    fn bind_then_resolve() {
        let block = ObjectBlock::new(Genre::Link, Subject::ephemeral());
        let mut ctx = Context::created(Address::generate(), block);
        assert_eq!(resolve(&ctx).unwrap(), "");
        bind(&mut ctx, "/docs/notes.txt").unwrap();
        assert_eq!(resolve(&ctx).unwrap(), "/docs/notes.txt");
    }
}
