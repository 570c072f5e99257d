use std::sync::Arc;

use strata_journal::Journal;
use strata_path::{Resolver, Route};
use strata_rights::{Access, Rights};
use strata_types::{Genre, Identifier, Operation, Subject};
use tracing::{debug, error, info, warn};

use crate::actor::{Actor, ActorState};
use crate::automaton::Automaton;
use crate::context::{Context, Information};
use crate::error::{GearError, GearResult};
use crate::guard::Guard;
use crate::registry::ActorRegistry;
use crate::scope::{Scope, Shutdown};
use crate::table::ScopeTable;

/// The access controller.
///
/// Owns the actor registry and the scope table, and drives every entry
/// point through the same sequence: resolve the actor, take the scope lock,
/// check rights, run the automaton, update actor state.
pub struct Gear {
    registry: ActorRegistry,
    table: ScopeTable,
    automaton: Automaton,
    rights: Arc<dyn Rights>,
    resolver: Arc<Resolver>,
    journal: Journal,
    subject: Subject,
}

impl Gear {
    /// Build a controller acting as `subject`.
    ///
    /// Contexts are loaded through the resolver's depot, which should be the
    /// journal overlay so that pending transcripts stay visible.
    pub fn new(
        subject: Subject,
        rights: Arc<dyn Rights>,
        resolver: Arc<Resolver>,
        journal: Journal,
    ) -> Self {
        Self {
            registry: ActorRegistry::new(),
            table: ScopeTable::new(),
            automaton: Automaton::new(Arc::clone(resolver.depot())),
            rights,
            resolver,
            journal,
            subject,
        }
    }

    pub fn registry(&self) -> &ActorRegistry {
        &self.registry
    }

    pub fn table(&self) -> &ScopeTable {
        &self.table
    }

    pub fn resolver(&self) -> &Arc<Resolver> {
        &self.resolver
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn subject(&self) -> Subject {
        self.subject
    }

    // -----------------------------------------------------------------------
    // Actors
    // -----------------------------------------------------------------------

    /// The registered actor and its live scope.
    pub fn actor(&self, id: Identifier) -> GearResult<(Actor, Arc<Scope>)> {
        let actor = self.registry.lookup(id)?;
        let scope = actor.scope()?;
        Ok((actor, scope))
    }

    pub fn scope_of(&self, id: Identifier) -> GearResult<Arc<Scope>> {
        self.actor(id).map(|(_, scope)| scope)
    }

    fn attach(&self, scope: &Arc<Scope>) -> GearResult<Identifier> {
        let id = self.registry.mint();
        if let Err(e) = self
            .registry
            .register(id, Actor::new(id, Arc::downgrade(scope)))
        {
            if let Err(undo) = self.registry.release(id) {
                warn!(actor = %id, error = %undo, "failed to release reservation");
            }
            return Err(e);
        }
        if let Err(e) = scope.attach(id) {
            if let Err(undo) = self.registry.unregister(id) {
                warn!(actor = %id, error = %undo, "failed to unregister unattached actor");
            }
            return Err(e);
        }
        Ok(id)
    }

    /// Unregister `id` and remove it from its scope's attached set.
    pub fn detach(&self, id: Identifier) -> GearResult<()> {
        let actor = self.registry.unregister(id)?;
        match actor.scope() {
            Ok(scope) => scope.detach(id),
            Err(_) => Ok(()),
        }
    }

    /// Wrap a live actor in a guard that detaches it unless committed.
    pub fn adopt(&self, id: Identifier) -> GearResult<Guard<'_>> {
        let scope = self.scope_of(id)?;
        Ok(Guard::for_actor(self, id, scope))
    }

    /// Annihilate an empty scope, or give it a shutdown attempt if its
    /// lock is free.
    pub(crate) fn settle(&self, scope: &Arc<Scope>) {
        if scope.actor_count() > 0 || self.table.annihilate(scope) {
            return;
        }
        let Some(mut slot) = scope.try_write() else {
            debug!(scope = scope.tag(), "scope busy, leaving shutdown to its holder");
            return;
        };
        if let Err(e) = scope.shutdown(&mut slot, &self.automaton, &self.table, &self.journal) {
            error!(scope = scope.tag(), error = %e, "shutdown failed, scope stays resident");
        }
    }

    // -----------------------------------------------------------------------
    // Opening
    // -----------------------------------------------------------------------

    /// Create a new object in a fresh unbound scope.
    pub async fn create(&self, genre: Genre) -> GearResult<Identifier> {
        let scope = self.table.supply();
        let mut guard = Guard::for_scope(self, Arc::clone(&scope));
        let mut slot = scope.write().await;
        scope.install(&mut slot, self.automaton.create(genre, self.subject));

        let id = self.attach(&scope)?;
        guard.set_actor(id);
        drop(slot);

        guard.commit();
        info!(actor = %id, scope = scope.tag(), %genre, "object created");
        Ok(id)
    }

    /// Open the object at `route`, sharing the scope of any concurrent
    /// caller on the same location.
    ///
    /// A resolution or depot failure may come from a stale route cache, so
    /// the cache is cleared and the load retried once before giving up.
    pub async fn load(&self, route: &Route) -> GearResult<Identifier> {
        match self.try_load(route).await {
            Err(e) if e.is_resolution() => {
                warn!(%route, error = %e, "load failed, clearing route cache and retrying");
                self.resolver.clear();
                self.try_load(route)
                    .await
                    .map_err(|e| GearError::LoadFailure {
                        route: route.to_string(),
                        reason: e.to_string(),
                    })
            }
            other => other,
        }
    }

    async fn try_load(&self, route: &Route) -> GearResult<Identifier> {
        loop {
            let location = self.resolver.resolve(route).await?;
            let scope = self.table.acquire(Some(route.clone()), location);
            let guard = Guard::for_scope(self, Arc::clone(&scope));
            let mut slot = scope.write().await;
            if scope.is_defunct() {
                // Sealed while we waited for the lock; the next acquire
                // yields a fresh scope.
                debug!(%route, scope = scope.tag(), "scope sealed while waiting, retrying");
                drop(slot);
                guard.commit();
                continue;
            }
            scope.materialize(&mut slot, &self.automaton).await?;

            let id = self.attach(&scope)?;
            drop(slot);
            guard.commit();
            debug!(actor = %id, %route, scope = scope.tag(), "object loaded");
            return Ok(id);
        }
    }

    // -----------------------------------------------------------------------
    // Access
    // -----------------------------------------------------------------------

    /// Run `f` against the actor's context under the write lock.
    pub async fn mutate<T>(
        &self,
        id: Identifier,
        f: impl FnOnce(&mut Context) -> GearResult<T>,
    ) -> GearResult<T> {
        let scope = self.scope_of(id)?;
        let mut slot = scope.write().await;
        self.registry.lookup(id)?;
        let context = slot.as_mut().ok_or(GearError::UnknownScope(id))?;
        self.rights.access(context.block(), Access::Write)?;

        let value = f(context)?;
        self.registry.set_state(id, ActorState::Updated)?;
        Ok(value)
    }

    /// Run `f` against the actor's context under the read lock.
    pub async fn inspect<T>(
        &self,
        id: Identifier,
        f: impl FnOnce(&Context) -> GearResult<T>,
    ) -> GearResult<T> {
        self.observe(id, |context| {
            self.rights.access(context.block(), Access::Read)?;
            f(context)
        })
        .await
    }

    pub async fn information(&self, id: Identifier) -> GearResult<Information> {
        self.observe(id, |context| Ok(Information::from(context))).await
    }

    async fn observe<T>(
        &self,
        id: Identifier,
        f: impl FnOnce(&Context) -> GearResult<T>,
    ) -> GearResult<T> {
        let scope = self.scope_of(id)?;
        let slot = scope.read().await;
        self.registry.lookup(id)?;
        let context = slot.as_ref().ok_or(GearError::UnknownScope(id))?;
        f(context)
    }

    // -----------------------------------------------------------------------
    // Closing
    // -----------------------------------------------------------------------

    /// Close the actor's session with `operation`.
    ///
    /// Rights and validation run before anything changes; a rejection
    /// leaves the actor attached. Otherwise the actor is detached, the
    /// operation folded into the context, and the scope sealed if it was
    /// the last one. A failed seal is logged and the scope stays resident
    /// until a later detach retries it.
    pub async fn close(&self, id: Identifier, operation: Operation) -> GearResult<()> {
        let scope = self.scope_of(id)?;
        let mut slot = scope.write().await;
        let actor = self.registry.lookup(id)?;
        let context = slot.as_mut().ok_or(GearError::UnknownScope(id))?;

        self.rights.operate(context.block(), operation)?;
        actor.operate(&scope, operation)?;

        let mut guard = Guard::for_actor(self, id, Arc::clone(&scope));
        guard.release_actor()?;
        scope.operate(context, operation);
        guard.commit();

        match scope.shutdown(&mut slot, &self.automaton, &self.table, &self.journal) {
            Ok(Shutdown::Sealed(recorded)) => {
                debug!(actor = %id, scope = scope.tag(), ?recorded, "closed and sealed");
            }
            Ok(Shutdown::Declined) => {
                debug!(actor = %id, scope = scope.tag(), "closed, scope still open");
            }
            Err(e) => {
                error!(actor = %id, scope = scope.tag(), error = %e, "shutdown failed, scope stays resident");
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------------

    /// Force-detach every registered actor and drop every scope.
    pub fn teardown(&self) -> usize {
        let actors = self.registry.drain();
        for actor in &actors {
            if let Ok(scope) = actor.scope() {
                let _ = scope.detach(actor.identifier());
            }
        }
        let scopes = self.table.len();
        self.table.clear();
        info!(actors = actors.len(), scopes, "gear torn down");
        actors.len()
    }
}

impl std::fmt::Debug for Gear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gear")
            .field("subject", &self.subject.short_id())
            .field("actors", &self.registry.len())
            .field("scopes", &self.table.len())
            .finish()
    }
}
