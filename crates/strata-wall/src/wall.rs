use std::sync::Arc;

use strata_gear::{Gear, Guard, Information};
use strata_journal::{Journal, JournalEvent, JournaledDepot};
use strata_path::{Resolver, Route};
use strata_rights::SubjectRights;
use strata_store::Depot;
use strata_types::{Address, Genre, Identifier, Operation, Subject};
use tokio::sync::broadcast;
use tracing::info;

use crate::config::WallConfig;
use crate::error::WallResult;

/// Entry points for opening, mutating and closing objects.
///
/// Every call except [`create`](Wall::create) and [`load`](Wall::load)
/// takes an identifier returned by one of them and fails with
/// `UnknownActor` once that identifier has been closed.
pub struct Wall {
    gear: Gear,
    journal: Journal,
}

impl Wall {
    /// Assemble the stack over `depot`, acting as `subject`.
    ///
    /// Starts the journal worker, so this must be called from within a
    /// tokio runtime. Unapplied transcripts left in the WAL are replayed
    /// first.
    pub fn open(
        config: WallConfig,
        subject: Subject,
        depot: Arc<dyn Depot>,
        root: Address,
    ) -> WallResult<Self> {
        let journal = Journal::start(depot, config.journal)?;
        let overlay: Arc<dyn Depot> = Arc::new(JournaledDepot::new(journal.clone()));
        let resolver = Arc::new(Resolver::new(overlay, root, &config.shrub));
        let rights = Arc::new(SubjectRights::new(subject, config.rights));
        let gear = Gear::new(subject, rights, resolver, journal.clone());

        info!(subject = %subject.short_id(), root = %root.short_hex(), "wall opened");
        Ok(Self { gear, journal })
    }

    pub fn gear(&self) -> &Gear {
        &self.gear
    }

    pub fn subject(&self) -> Subject {
        self.gear.subject()
    }

    // ---- Opening ----

    pub async fn create(&self, genre: Genre) -> WallResult<Identifier> {
        Ok(self.gear.create(genre).await?)
    }

    /// Open the object at absolute `path`.
    pub async fn load(&self, path: &str) -> WallResult<Identifier> {
        let route = Route::parse(path)?;
        Ok(self.gear.load(&route).await?)
    }

    /// Guard `id` so that it is detached if the guard is dropped unclosed.
    pub fn guard(&self, id: Identifier) -> WallResult<Guard<'_>> {
        Ok(self.gear.adopt(id)?)
    }

    pub async fn information(&self, id: Identifier) -> WallResult<Information> {
        Ok(self.gear.information(id).await?)
    }

    // ---- Closing ----

    /// Close `id` leaving the depot untouched.
    pub async fn discard(&self, id: Identifier) -> WallResult<()> {
        Ok(self.gear.close(id, Operation::Discard).await?)
    }

    /// Close `id` persisting its changes.
    pub async fn store(&self, id: Identifier) -> WallResult<()> {
        Ok(self.gear.close(id, Operation::Store).await?)
    }

    /// Close `id` deleting the object.
    pub async fn destroy(&self, id: Identifier) -> WallResult<()> {
        Ok(self.gear.close(id, Operation::Destroy).await?)
    }

    // ---- Journal ----

    /// Wait until every sealed scope has reached the depot.
    pub async fn flush(&self) -> WallResult<()> {
        Ok(self.journal.flush().await?)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JournalEvent> {
        self.journal.subscribe()
    }

    pub fn pending(&self) -> usize {
        self.journal.pending_count()
    }

    /// Force-detach every open actor, drain the journal and close it.
    ///
    /// Open sessions are dropped without sealing. Returns how many actors
    /// were still registered.
    pub async fn teardown(&self) -> WallResult<usize> {
        let actors = self.gear.teardown();
        self.journal.flush().await?;
        self.journal.close();
        info!(actors, "wall torn down");
        Ok(actors)
    }
}

impl std::fmt::Debug for Wall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wall").field("gear", &self.gear).finish()
    }
}
