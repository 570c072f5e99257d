use std::sync::Arc;

use strata_types::Identifier;
use tracing::{debug, warn};

use crate::error::GearResult;
use crate::gear::Gear;
use crate::scope::Scope;

/// Scoped ownership of an actor and/or a scope.
///
/// Unless [`commit`](Guard::commit) is called, dropping the guard detaches
/// the actor and then settles the scope: an empty unmaterialized or unbound
/// scope is annihilated, any other empty scope gets a shutdown attempt if
/// its lock is free. This runs on every exit path, including early `?`
/// returns and futures dropped at a suspension point.
#[must_use = "dropping a guard immediately releases what it holds"]
pub struct Guard<'g> {
    gear: &'g Gear,
    actor: Option<Identifier>,
    scope: Option<Arc<Scope>>,
}

impl<'g> Guard<'g> {
    pub fn for_scope(gear: &'g Gear, scope: Arc<Scope>) -> Self {
        Self {
            gear,
            actor: None,
            scope: Some(scope),
        }
    }

    pub fn for_actor(gear: &'g Gear, actor: Identifier, scope: Arc<Scope>) -> Self {
        Self {
            gear,
            actor: Some(actor),
            scope: Some(scope),
        }
    }

    /// Take responsibility for `actor` as well.
    pub fn set_actor(&mut self, actor: Identifier) {
        self.actor = Some(actor);
    }

    pub fn actor(&self) -> Option<Identifier> {
        self.actor
    }

    pub fn scope(&self) -> Option<&Arc<Scope>> {
        self.scope.as_ref()
    }

    /// Detach the held actor now. The scope stays held.
    pub fn release_actor(&mut self) -> GearResult<()> {
        match self.actor.take() {
            Some(actor) => self.gear.detach(actor),
            None => Ok(()),
        }
    }

    /// Transfer ownership away; nothing is released on drop.
    pub fn commit(mut self) {
        self.actor = None;
        self.scope = None;
    }
}

impl Drop for Guard<'_> {
    fn drop(&mut self) {
        if let Some(actor) = self.actor.take() {
            debug!(%actor, "guard releasing actor");
            if let Err(e) = self.gear.detach(actor) {
                warn!(%actor, error = %e, "guard failed to detach actor");
            }
        }
        if let Some(scope) = self.scope.take() {
            self.gear.settle(&scope);
        }
    }
}

impl std::fmt::Debug for Guard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guard")
            .field("actor", &self.actor)
            .field("scope", &self.scope.as_ref().map(|s| s.tag()))
            .finish()
    }
}
