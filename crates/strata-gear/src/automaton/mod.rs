//! Genre-specific operations on a [`Context`].
//!
//! Content operations (`file`, `directory`, `link`) mutate the in-memory
//! payload only. The closing operations turn a context into a
//! [`Transcript`](strata_journal::Transcript) of depot mutations; nothing
//! reaches the depot until the journal applies it.

pub mod directory;
pub mod file;
pub mod link;

use std::sync::Arc;

use strata_journal::Action;
use strata_store::{Contents, Depot, ObjectBlock};
use strata_types::{Address, Genre, Location, Operation, Subject};
use tracing::debug;

use crate::context::{Context, ContextState};
use crate::error::{GearError, GearResult};

/// Materializes contexts and closes them.
pub struct Automaton {
    depot: Arc<dyn Depot>,
}

impl Automaton {
    pub fn new(depot: Arc<dyn Depot>) -> Self {
        Self { depot }
    }

    /// A fresh object of `genre` at a newly minted address.
    pub fn create(&self, genre: Genre, owner: Subject) -> Context {
        let address = Address::generate();
        debug!(address = %address.short_hex(), %genre, "object created");
        Context::created(address, ObjectBlock::new(genre, owner))
    }

    /// Pull the object at `location`, reading its genre first.
    pub async fn load(&self, location: &Location) -> GearResult<Context> {
        let block = self.depot.pull_object(location).await?;
        let contents = match block.contents {
            Some(id) => self.depot.pull_contents(&id).await?,
            None => Contents::empty(block.genre),
        };
        if contents.genre() != block.genre {
            return Err(GearError::GenreMismatch {
                expected: block.genre,
                actual: contents.genre(),
            });
        }
        debug!(%location, genre = %block.genre, revision = block.revision, "object loaded");
        Ok(Context::loaded(location.address, block, contents))
    }

    /// Run the closing automaton for `operation`.
    pub fn close(&self, context: &mut Context, operation: Operation) -> GearResult<()> {
        match operation {
            Operation::Discard => self.discard(context),
            Operation::Store => self.store(context),
            Operation::Destroy => self.destroy(context),
        }
    }

    /// Leave the depot untouched.
    pub fn discard(&self, context: &mut Context) -> GearResult<()> {
        context.state = ContextState::Discarded;
        Ok(())
    }

    /// Push the contents and a new object revision, if anything changed.
    pub fn store(&self, context: &mut Context) -> GearResult<()> {
        if context.is_dirty() {
            let contents = context.contents().clone();
            let id = contents.id()?;
            let mut block = context.block().clone();
            block.revision += 1;
            block.contents = Some(id);
            block.size = contents.size();
            let address = context.address();
            context
                .transcript
                .record(Action::PushContents { id, contents });
            context.transcript.record(Action::PushObject { address, block });
        }
        context.state = ContextState::Stored;
        Ok(())
    }

    /// Schedule the object's removal.
    pub fn destroy(&self, context: &mut Context) -> GearResult<()> {
        // Never pushed, nothing to wipe.
        if context.block().revision > 0 {
            let address = context.address();
            context.transcript.record(Action::Wipe { address });
        }
        context.state = ContextState::Destroyed;
        Ok(())
    }
}

impl std::fmt::Debug for Automaton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Automaton").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_store::InMemoryDepot;
    use strata_types::Revision;

    fn automaton() -> (Arc<InMemoryDepot>, Automaton) {
        let depot = Arc::new(InMemoryDepot::new());
        (depot.clone(), Automaton::new(depot))
    }

    // --- Materialization ---

    #[tokio::test]
    async fn load_picks_payload_from_genre() {
        let (depot, automaton) = automaton();
        let root = depot.bootstrap_root(Subject::ephemeral()).unwrap();
        let ctx = automaton.load(&Location::latest(root)).await.unwrap();
        assert_eq!(ctx.genre(), Genre::Directory);
        assert_eq!(ctx.state(), ContextState::Loaded);
        assert!(ctx.directory().unwrap().is_empty());
    }

    #[tokio::test]
    async fn load_missing_object_fails() {
        let (_, automaton) = automaton();
        let err = automaton
            .load(&Location::new(Address::generate(), Revision::Any))
            .await
            .unwrap_err();
        assert!(matches!(err, GearError::Depot(_)));
    }

    #[tokio::test]
    async fn load_of_block_without_contents_is_empty() {
        let (depot, automaton) = automaton();
        let address = Address::generate();
        let mut block = ObjectBlock::new(Genre::File, Subject::ephemeral());
        block.revision = 1;
        depot.push_object(address, block).await.unwrap();
        let ctx = automaton.load(&Location::latest(address)).await.unwrap();
        assert!(ctx.file().unwrap().is_empty());
    }

    // --- Closing ---

    #[test]
    fn store_of_created_object_pushes_first_revision() {
        let (_, automaton) = automaton();
        let mut ctx = automaton.create(Genre::File, Subject::ephemeral());
        file::write(&mut ctx, 0, b"hello").unwrap();
        automaton.store(&mut ctx).unwrap();

        assert_eq!(ctx.state(), ContextState::Stored);
        let actions = ctx.transcript().actions();
        assert_eq!(actions.len(), 2);
        match &actions[1] {
            Action::PushObject { block, .. } => {
                assert_eq!(block.revision, 1);
                assert_eq!(block.size, 5);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[tokio::test]
    async fn store_of_clean_object_records_nothing() {
        let (depot, automaton) = automaton();
        let root = depot.bootstrap_root(Subject::ephemeral()).unwrap();
        let mut ctx = automaton.load(&Location::latest(root)).await.unwrap();
        automaton.store(&mut ctx).unwrap();
        assert!(ctx.transcript().is_empty());
        assert_eq!(ctx.state(), ContextState::Stored);
    }

    #[test]
    fn discard_records_nothing() {
        let (_, automaton) = automaton();
        let mut ctx = automaton.create(Genre::Link, Subject::ephemeral());
        automaton.close(&mut ctx, Operation::Discard).unwrap();
        assert!(ctx.transcript().is_empty());
        assert_eq!(ctx.state(), ContextState::Discarded);
    }

    #[tokio::test]
    async fn destroy_records_wipe_for_stored_objects_only() {
        let (depot, automaton) = automaton();
        let mut created = automaton.create(Genre::File, Subject::ephemeral());
        automaton.destroy(&mut created).unwrap();
        assert!(created.transcript().is_empty());

        let root = depot.bootstrap_root(Subject::ephemeral()).unwrap();
        let mut loaded = automaton.load(&Location::latest(root)).await.unwrap();
        automaton.destroy(&mut loaded).unwrap();
        assert_eq!(loaded.transcript().wipes(), 1);
        assert_eq!(loaded.state(), ContextState::Destroyed);
    }
}
