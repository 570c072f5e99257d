use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use strata_journal::{Journal, Recorded};
use strata_path::Route;
use strata_types::{Identifier, Location, Operation};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

use crate::automaton::Automaton;
use crate::context::Context;
use crate::error::{GearError, GearResult};
use crate::table::ScopeTable;

/// Read access to a scope's context slot.
pub type ReadSlot<'a> = RwLockReadGuard<'a, Option<Context>>;

/// Exclusive access to a scope's context slot.
pub type WriteSlot<'a> = RwLockWriteGuard<'a, Option<Context>>;

/// What [`Scope::shutdown`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shutdown {
    /// Nothing was sealed: actors remain or there is nothing to close.
    Declined,
    /// The scope was sealed and its transcript handed to the journal.
    Sealed(Recorded),
}

/// The unique in-memory slot for one logical object.
///
/// A bound scope is keyed in the [`ScopeTable`] by location, so every caller
/// touching the same object shares its context. An unbound scope holds a
/// freshly created object that no one else can reach.
///
/// The context lives behind an async read/write lock: every mutating entry
/// point takes the write lock, every other one the read lock. The attached
/// set and bindings sit behind short synchronous locks never held across a
/// suspension point.
pub struct Scope {
    tag: u64,
    bound: bool,
    location: Option<Location>,
    route: Mutex<Option<Route>>,
    actors: Mutex<Vec<Identifier>>,
    context: RwLock<Option<Context>>,
    materialized: AtomicBool,
    defunct: AtomicBool,
}

impl Scope {
    pub(crate) fn bound(tag: u64, location: Location, route: Option<Route>) -> Self {
        Self::new(tag, Some(location), route)
    }

    pub(crate) fn unbound(tag: u64) -> Self {
        Self::new(tag, None, None)
    }

    fn new(tag: u64, location: Option<Location>, route: Option<Route>) -> Self {
        Self {
            tag,
            bound: location.is_some(),
            location,
            route: Mutex::new(route),
            actors: Mutex::new(Vec::new()),
            context: RwLock::new(None),
            materialized: AtomicBool::new(false),
            defunct: AtomicBool::new(false),
        }
    }

    /// Process-unique tag, used to correlate journal records.
    pub fn tag(&self) -> u64 {
        self.tag
    }

    /// Whether the scope was bound to a location when it was created.
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn route(&self) -> Option<Route> {
        self.route.lock().expect("route lock poisoned").clone()
    }

    pub(crate) fn set_route(&self, route: Option<Route>) {
        *self.route.lock().expect("route lock poisoned") = route;
    }

    /// Sealed or annihilated; no longer reachable through the table.
    pub fn is_defunct(&self) -> bool {
        self.defunct.load(Ordering::Acquire)
    }

    pub(crate) fn mark_defunct(&self) {
        self.defunct.store(true, Ordering::Release);
    }

    pub fn is_materialized(&self) -> bool {
        self.materialized.load(Ordering::Acquire)
    }

    // -----------------------------------------------------------------------
    // Attachment
    // -----------------------------------------------------------------------

    pub fn attach(&self, actor: Identifier) -> GearResult<()> {
        let mut actors = self.actors.lock().expect("actors lock poisoned");
        if actors.contains(&actor) {
            return Err(GearError::AlreadyAttached(actor));
        }
        actors.push(actor);
        debug!(scope = self.tag, %actor, attached = actors.len(), "actor attached");
        Ok(())
    }

    pub fn detach(&self, actor: Identifier) -> GearResult<()> {
        let mut actors = self.actors.lock().expect("actors lock poisoned");
        let position = actors
            .iter()
            .position(|a| *a == actor)
            .ok_or(GearError::NotAttached(actor))?;
        actors.swap_remove(position);
        debug!(scope = self.tag, %actor, attached = actors.len(), "actor detached");
        Ok(())
    }

    pub fn actor_count(&self) -> usize {
        self.actors.lock().expect("actors lock poisoned").len()
    }

    pub fn actors(&self) -> Vec<Identifier> {
        self.actors.lock().expect("actors lock poisoned").clone()
    }

    // -----------------------------------------------------------------------
    // Context access
    // -----------------------------------------------------------------------

    pub async fn read(&self) -> ReadSlot<'_> {
        self.context.read().await
    }

    pub async fn write(&self) -> WriteSlot<'_> {
        self.context.write().await
    }

    /// Exclusive access without waiting, if nobody holds the lock.
    pub fn try_write(&self) -> Option<WriteSlot<'_>> {
        self.context.try_write().ok()
    }

    /// Install a context into an empty slot.
    pub(crate) fn install(&self, slot: &mut WriteSlot<'_>, context: Context) {
        **slot = Some(context);
        self.materialized.store(true, Ordering::Release);
    }

    /// Load the context from the depot unless already present.
    pub async fn materialize(
        &self,
        slot: &mut WriteSlot<'_>,
        automaton: &Automaton,
    ) -> GearResult<()> {
        if slot.is_some() {
            return Ok(());
        }
        let Some(location) = self.location else {
            return Err(GearError::LoadFailure {
                route: self.describe(),
                reason: "unbound scope has no location to load".into(),
            });
        };
        let context = automaton.load(&location).await?;
        self.install(slot, context);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Closing
    // -----------------------------------------------------------------------

    /// Fold a detaching actor's operation into the context.
    ///
    /// An unset operation takes the request; a set one is only replaced by a
    /// stronger one (discard < store < destroy).
    pub fn operate(&self, context: &mut Context, operation: Operation) {
        let folded = Operation::fold(context.operation, operation);
        if context.operation != Some(folded) {
            debug!(scope = self.tag, from = ?context.operation, to = %folded, "operation folded");
        }
        context.operation = Some(folded);
    }

    /// Seal the scope and hand it to the journal once no actor remains.
    ///
    /// The scope is relinquished from the table before the closing automaton
    /// runs so that a concurrent load starts from a fresh scope. On failure
    /// the context is restored, the scope is put back, and the error is
    /// returned; a later detach retries.
    pub fn shutdown(
        self: &Arc<Self>,
        slot: &mut WriteSlot<'_>,
        automaton: &Automaton,
        table: &ScopeTable,
        journal: &Journal,
    ) -> GearResult<Shutdown> {
        if self.actor_count() > 0 || self.is_defunct() {
            return Ok(Shutdown::Declined);
        }
        let Some(context) = slot.as_mut() else {
            return Ok(Shutdown::Declined);
        };
        let Some(operation) = context.operation else {
            debug!(scope = self.tag, "no operation folded, shutdown declined");
            return Ok(Shutdown::Declined);
        };

        table.relinquish(self);
        let prior = context.state;
        let mark = context.transcript.len();
        let result = automaton.close(context, operation).and_then(|()| {
            journal
                .record(self.tag, &context.transcript)
                .map_err(GearError::from)
        });

        match result {
            Ok(recorded) => {
                context.transcript.clear();
                self.mark_defunct();
                info!(scope = self.tag, %operation, ?recorded, "scope sealed");
                Ok(Shutdown::Sealed(recorded))
            }
            Err(e) => {
                context.state = prior;
                context.transcript.truncate(mark);
                table.inclose(Arc::clone(self));
                Err(GearError::ShutdownFailure {
                    tag: self.tag,
                    reason: e.to_string(),
                })
            }
        }
    }

    fn describe(&self) -> String {
        match self.route() {
            Some(route) => route.to_string(),
            None => format!("scope {}", self.tag),
        }
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("tag", &self.tag)
            .field("location", &self.location)
            .field("route", &self.route())
            .field("attached", &self.actor_count())
            .field("defunct", &self.is_defunct())
            .finish()
    }
}
