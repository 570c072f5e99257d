use std::sync::Mutex;

use strata_types::Identifier;
use tracing::debug;

use crate::actor::{Actor, ActorState};
use crate::error::{GearError, GearResult};

enum Entry {
    Vacant,
    /// Minted but not yet registered.
    Reserved,
    Occupied(Actor),
}

struct Slot {
    generation: u32,
    entry: Entry,
}

#[derive(Default)]
struct Arena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl Arena {
    fn slot_mut(&mut self, id: Identifier) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
    }
}

/// Identifier to actor map, owned by one [`Gear`](crate::Gear).
///
/// Identifiers are generational arena handles: once an actor is
/// unregistered its slot's generation moves on, so the stale identifier can
/// never resolve to whatever actor reuses the slot.
#[derive(Default)]
pub struct ActorRegistry {
    arena: Mutex<Arena>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a fresh identifier.
    pub fn mint(&self) -> Identifier {
        let mut arena = self.arena.lock().expect("registry lock poisoned");
        if let Some(index) = arena.free.pop() {
            let slot = &mut arena.slots[index as usize];
            slot.entry = Entry::Reserved;
            return Identifier::new(index, slot.generation);
        }
        let index = arena.slots.len() as u32;
        arena.slots.push(Slot {
            generation: 0,
            entry: Entry::Reserved,
        });
        Identifier::new(index, 0)
    }

    /// Bind a minted identifier to its actor.
    pub fn register(&self, id: Identifier, actor: Actor) -> GearResult<()> {
        let mut arena = self.arena.lock().expect("registry lock poisoned");
        let slot = arena.slot_mut(id).ok_or(GearError::UnknownActor(id))?;
        match slot.entry {
            Entry::Occupied(_) => return Err(GearError::AlreadyRegistered(id)),
            Entry::Vacant => return Err(GearError::UnknownActor(id)),
            Entry::Reserved => {}
        }
        slot.entry = Entry::Occupied(actor);
        arena.live += 1;
        debug!(actor = %id, "actor registered");
        Ok(())
    }

    pub fn lookup(&self, id: Identifier) -> GearResult<Actor> {
        let mut arena = self.arena.lock().expect("registry lock poisoned");
        match arena.slot_mut(id).map(|slot| &slot.entry) {
            Some(Entry::Occupied(actor)) => Ok(actor.clone()),
            _ => Err(GearError::UnknownActor(id)),
        }
    }

    pub fn set_state(&self, id: Identifier, state: ActorState) -> GearResult<()> {
        let mut arena = self.arena.lock().expect("registry lock poisoned");
        match arena.slot_mut(id).map(|slot| &mut slot.entry) {
            Some(Entry::Occupied(actor)) => {
                actor.state = state;
                Ok(())
            }
            _ => Err(GearError::UnknownActor(id)),
        }
    }

    /// Remove an actor, retiring its identifier for good.
    pub fn unregister(&self, id: Identifier) -> GearResult<Actor> {
        let mut arena = self.arena.lock().expect("registry lock poisoned");
        let slot = arena.slot_mut(id).ok_or(GearError::UnknownActor(id))?;
        let actor = match std::mem::replace(&mut slot.entry, Entry::Vacant) {
            Entry::Occupied(actor) => actor,
            other => {
                slot.entry = other;
                return Err(GearError::UnknownActor(id));
            }
        };
        slot.generation = slot.generation.wrapping_add(1);
        arena.free.push(id.index());
        arena.live -= 1;
        debug!(actor = %id, "actor unregistered");
        Ok(actor)
    }

    /// Give back an identifier that was minted but never registered.
    pub fn release(&self, id: Identifier) -> GearResult<()> {
        let mut arena = self.arena.lock().expect("registry lock poisoned");
        let slot = arena.slot_mut(id).ok_or(GearError::UnknownActor(id))?;
        if !matches!(slot.entry, Entry::Reserved) {
            return Err(GearError::UnknownActor(id));
        }
        slot.entry = Entry::Vacant;
        slot.generation = slot.generation.wrapping_add(1);
        arena.free.push(id.index());
        debug!(actor = %id, "reservation released");
        Ok(())
    }

    /// Remove every registered actor. Shutdown-only.
    pub fn drain(&self) -> Vec<Actor> {
        let mut arena = self.arena.lock().expect("registry lock poisoned");
        let mut drained = Vec::with_capacity(arena.live);
        let mut freed = Vec::new();
        for (index, slot) in arena.slots.iter_mut().enumerate() {
            if let Entry::Occupied(actor) = std::mem::replace(&mut slot.entry, Entry::Vacant) {
                slot.generation = slot.generation.wrapping_add(1);
                freed.push(index as u32);
                drained.push(actor);
            }
        }
        arena.free.extend(freed);
        arena.live = 0;
        drained
    }

    /// Number of registered actors.
    pub fn len(&self) -> usize {
        self.arena.lock().expect("registry lock poisoned").live
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ActorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorRegistry")
            .field("live", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Weak;

    fn actor(id: Identifier) -> Actor {
        Actor::new(id, Weak::new())
    }

    #[test]
    fn register_and_lookup() {
        let registry = ActorRegistry::new();
        let id = registry.mint();
        registry.register(id, actor(id)).unwrap();
        assert_eq!(registry.lookup(id).unwrap().identifier(), id);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn double_register_fails() {
        let registry = ActorRegistry::new();
        let id = registry.mint();
        registry.register(id, actor(id)).unwrap();
        assert!(matches!(
            registry.register(id, actor(id)),
            Err(GearError::AlreadyRegistered(_))
        ));
    }

    #[test]
    fn unknown_identifiers_fail() {
        let registry = ActorRegistry::new();
        let foreign = Identifier::new(9, 0);
        assert!(matches!(registry.lookup(foreign), Err(GearError::UnknownActor(_))));
        assert!(matches!(registry.unregister(foreign), Err(GearError::UnknownActor(_))));
    }

    #[test]
    fn reserved_identifier_is_not_yet_an_actor() {
        let registry = ActorRegistry::new();
        let id = registry.mint();
        assert!(registry.lookup(id).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn stale_identifier_never_resolves_to_reused_slot() {
        let registry = ActorRegistry::new();
        let old = registry.mint();
        registry.register(old, actor(old)).unwrap();
        registry.unregister(old).unwrap();

        let new = registry.mint();
        assert_eq!(new.index(), old.index());
        assert_ne!(new.generation(), old.generation());
        registry.register(new, actor(new)).unwrap();

        assert!(registry.lookup(old).is_err());
        assert!(registry.unregister(old).is_err());
        assert!(registry.lookup(new).is_ok());
    }

    #[test]
    fn released_reservation_is_reused_under_new_generation() {
        let registry = ActorRegistry::new();
        let reserved = registry.mint();
        registry.release(reserved).unwrap();
        assert!(registry.release(reserved).is_err());
        assert!(registry.register(reserved, actor(reserved)).is_err());

        let next = registry.mint();
        assert_eq!(next.index(), reserved.index());
        assert_ne!(next.generation(), reserved.generation());
        assert!(registry.is_empty());
    }

    #[test]
    fn registered_identifier_cannot_be_released() {
        let registry = ActorRegistry::new();
        let id = registry.mint();
        registry.register(id, actor(id)).unwrap();
        assert!(matches!(registry.release(id), Err(GearError::UnknownActor(_))));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn set_state_updates_actor() {
        let registry = ActorRegistry::new();
        let id = registry.mint();
        registry.register(id, actor(id)).unwrap();
        registry.set_state(id, ActorState::Updated).unwrap();
        assert_eq!(registry.lookup(id).unwrap().state(), ActorState::Updated);
    }

    #[test]
    fn drain_empties_registry() {
        let registry = ActorRegistry::new();
        let ids: Vec<_> = (0..3).map(|_| registry.mint()).collect();
        for id in &ids {
            registry.register(*id, actor(*id)).unwrap();
        }
        assert_eq!(registry.drain().len(), 3);
        assert!(registry.is_empty());
        assert!(ids.iter().all(|id| registry.lookup(*id).is_err()));
        // Slots are reused afterwards.
        assert!(registry.mint().index() < 3);
    }

    #[test]
    fn detached_actor_has_no_scope() {
        let id = Identifier::new(0, 0);
        let actor = Actor::new(id, Weak::new());
        assert!(matches!(actor.scope(), Err(GearError::UnknownScope(_))));
    }
}
