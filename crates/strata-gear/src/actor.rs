use std::sync::{Arc, Weak};

use strata_types::{Identifier, Operation};
use tracing::debug;

use crate::error::{GearError, GearResult};
use crate::scope::Scope;

/// Whether an actor has modified its object since attaching.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActorState {
    #[default]
    Clean,
    Updated,
}

/// One caller's handle to an operation in progress on a [`Scope`].
///
/// The back-reference is weak: scopes own their attachment set, actors
/// never keep a scope alive.
#[derive(Clone, Debug)]
pub struct Actor {
    identifier: Identifier,
    scope: Weak<Scope>,
    pub(crate) state: ActorState,
}

impl Actor {
    pub fn new(identifier: Identifier, scope: Weak<Scope>) -> Self {
        Self {
            identifier,
            scope,
            state: ActorState::Clean,
        }
    }

    pub fn identifier(&self) -> Identifier {
        self.identifier
    }

    pub fn state(&self) -> ActorState {
        self.state
    }

    pub fn scope(&self) -> GearResult<Arc<Scope>> {
        self.scope
            .upgrade()
            .ok_or(GearError::UnknownScope(self.identifier))
    }

    /// Check that this actor may close its scope with `operation`.
    pub fn operate(&self, scope: &Scope, operation: Operation) -> GearResult<()> {
        validate(
            self.identifier,
            self.state,
            scope.is_bound(),
            scope.actor_count(),
            operation,
        )
    }
}

/// Decide whether an actor in `state` may declare `operation`.
///
/// Store and destroy are always legal. Discard is legal on an unbound
/// scope, for the sole actor on a bound scope, or for an actor that has
/// not modified anything; otherwise shared changes would be rolled back
/// under the feet of the other attached actors.
pub fn validate(
    actor: Identifier,
    state: ActorState,
    bound: bool,
    attached: usize,
    operation: Operation,
) -> GearResult<()> {
    let allowed = match operation {
        Operation::Store | Operation::Destroy => true,
        Operation::Discard => !bound || attached == 1 || state == ActorState::Clean,
    };
    if allowed {
        Ok(())
    } else {
        debug!(%actor, %operation, attached, "operation rejected");
        Err(GearError::InconsistentOperation {
            actor,
            operation,
            attached,
        })
    }
}
