use std::sync::Arc;

use async_trait::async_trait;
use strata_store::{Contents, Depot, DepotError, DepotResult, ObjectBlock};
use strata_types::{Address, ContentId, Location};

use crate::journal::{Journal, Retrieved};

/// Depot view that sees recorded transcripts before they are applied.
///
/// Pulls consult the journal's pending state first so a load racing a
/// not-yet-applied store observes the stored block, and a load racing a
/// pending wipe fails as if the object were already gone. Pushes go straight
/// to the underlying depot.
#[derive(Clone)]
pub struct JournaledDepot {
    journal: Journal,
    depot: Arc<dyn Depot>,
}

impl JournaledDepot {
    pub fn new(journal: Journal) -> Self {
        let depot = Arc::clone(journal.depot());
        Self { journal, depot }
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }
}

#[async_trait]
impl Depot for JournaledDepot {
    async fn pull_object(&self, location: &Location) -> DepotResult<ObjectBlock> {
        match self.journal.retrieve(&location.address) {
            Some(Retrieved::Wiped) => Err(DepotError::NotFound(location.address)),
            Some(Retrieved::Block(block)) if location.revision.matches(block.revision) => {
                Ok(block)
            }
            _ => self.depot.pull_object(location).await,
        }
    }

    async fn push_object(&self, address: Address, block: ObjectBlock) -> DepotResult<()> {
        self.depot.push_object(address, block).await
    }

    async fn wipe_object(&self, address: &Address) -> DepotResult<bool> {
        self.depot.wipe_object(address).await
    }

    async fn pull_contents(&self, id: &ContentId) -> DepotResult<Contents> {
        match self.journal.retrieve_contents(id) {
            Some(contents) => Ok(contents),
            None => self.depot.pull_contents(id).await,
        }
    }

    async fn push_contents(&self, contents: &Contents) -> DepotResult<ContentId> {
        self.depot.push_contents(contents).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::JournalConfig;
    use crate::transcript::{Action, Transcript};
    use strata_store::InMemoryDepot;
    use strata_types::{Genre, Revision, Subject};

    async fn seeded() -> (Arc<InMemoryDepot>, Address, JournaledDepot) {
        let depot = Arc::new(InMemoryDepot::new());
        let address = Address::generate();
        let mut block = ObjectBlock::new(Genre::File, Subject::ephemeral());
        block.revision = 1;
        depot.push_object(address, block).await.unwrap();
        let journal = Journal::start(depot.clone(), JournalConfig::default()).unwrap();
        (depot, address, JournaledDepot::new(journal))
    }

    #[tokio::test]
    async fn pending_block_shadows_depot() {
        let (_depot, address, overlay) = seeded().await;
        let mut block = overlay
            .pull_object(&Location::latest(address))
            .await
            .unwrap();
        block.revision = 2;
        let mut transcript = Transcript::new();
        transcript.record(Action::PushObject { address, block });
        overlay.journal().record(1, &transcript).unwrap();

        let seen = overlay.pull_object(&Location::latest(address)).await.unwrap();
        assert_eq!(seen.revision, 2);

        // An exact pull of the old revision still reaches the depot.
        let old = overlay
            .pull_object(&Location::new(address, Revision::Exact(1)))
            .await
            .unwrap();
        assert_eq!(old.revision, 1);
    }

    #[tokio::test]
    async fn pending_wipe_hides_object() {
        let (_depot, address, overlay) = seeded().await;
        let mut transcript = Transcript::new();
        transcript.record(Action::Wipe { address });
        overlay.journal().record(1, &transcript).unwrap();

        let err = overlay
            .pull_object(&Location::latest(address))
            .await
            .unwrap_err();
        assert!(matches!(err, DepotError::NotFound(a) if a == address));
    }

    #[tokio::test]
    async fn pending_contents_are_served() {
        let (depot, _, overlay) = seeded().await;
        let contents = Contents::File(b"queued".to_vec());
        let id = contents.id().unwrap();
        let mut transcript = Transcript::new();
        transcript.record(Action::PushContents {
            id,
            contents: contents.clone(),
        });
        overlay.journal().record(1, &transcript).unwrap();

        assert!(depot.pull_contents(&id).await.is_err());
        assert_eq!(overlay.pull_contents(&id).await.unwrap(), contents);
    }
}
