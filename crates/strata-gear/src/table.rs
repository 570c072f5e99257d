use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use strata_path::Route;
use strata_types::Location;
use tracing::debug;

use crate::scope::Scope;

#[derive(Default)]
struct Slots {
    onymous: HashMap<Location, Arc<Scope>>,
    anonymous: HashMap<u64, Arc<Scope>>,
}

/// Index of live scopes.
///
/// Bound scopes are keyed by location so that at most one live scope exists
/// per location; unbound scopes are keyed by their tag.
pub struct ScopeTable {
    slots: Mutex<Slots>,
    next_tag: AtomicU64,
}

impl ScopeTable {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(Slots::default()),
            next_tag: AtomicU64::new(1),
        }
    }

    fn tag(&self) -> u64 {
        self.next_tag.fetch_add(1, Ordering::Relaxed)
    }

    /// Return the live scope for `location`, creating one if absent.
    pub fn acquire(&self, route: Option<Route>, location: Location) -> Arc<Scope> {
        let mut slots = self.slots.lock().expect("scope table lock poisoned");
        if let Some(scope) = slots.onymous.get(&location) {
            return Arc::clone(scope);
        }
        let scope = Arc::new(Scope::bound(self.tag(), location, route));
        debug!(scope = scope.tag(), %location, "bound scope created");
        slots.onymous.insert(location, Arc::clone(&scope));
        scope
    }

    /// Create a fresh unbound scope.
    pub fn supply(&self) -> Arc<Scope> {
        let scope = Arc::new(Scope::unbound(self.tag()));
        debug!(scope = scope.tag(), "unbound scope created");
        self.slots
            .lock()
            .expect("scope table lock poisoned")
            .anonymous
            .insert(scope.tag(), Arc::clone(&scope));
        scope
    }

    /// Remove `scope` if it is the one currently indexed.
    pub fn relinquish(&self, scope: &Arc<Scope>) -> bool {
        let mut slots = self.slots.lock().expect("scope table lock poisoned");
        let removed = match scope.location() {
            Some(location) => match slots.onymous.get(&location) {
                Some(current) if Arc::ptr_eq(current, scope) => {
                    slots.onymous.remove(&location);
                    true
                }
                _ => false,
            },
            None => slots.anonymous.remove(&scope.tag()).is_some(),
        };
        if removed {
            debug!(scope = scope.tag(), "scope relinquished");
        }
        removed
    }

    /// Put a relinquished scope back, unless its slot was taken meanwhile.
    pub fn inclose(&self, scope: Arc<Scope>) -> bool {
        let mut slots = self.slots.lock().expect("scope table lock poisoned");
        let inserted = match scope.location() {
            Some(location) => {
                if slots.onymous.contains_key(&location) {
                    false
                } else {
                    slots.onymous.insert(location, Arc::clone(&scope));
                    true
                }
            }
            None => {
                slots.anonymous.insert(scope.tag(), Arc::clone(&scope));
                true
            }
        };
        debug!(scope = scope.tag(), inserted, "scope inclosed");
        inserted
    }

    /// Drop a scope that no operation will ever close.
    ///
    /// A bound scope whose context never materialized, or any unbound scope,
    /// is removed once no actor remains. A materialized bound scope stays
    /// resident: it carries no operation and will be reused by the next load.
    pub fn annihilate(&self, scope: &Arc<Scope>) -> bool {
        if scope.actor_count() > 0 || (scope.is_bound() && scope.is_materialized()) {
            return false;
        }
        scope.mark_defunct();
        let removed = self.relinquish(scope);
        if removed {
            debug!(scope = scope.tag(), "scope annihilated");
        }
        removed
    }

    pub fn retrieve(&self, location: &Location) -> Option<Arc<Scope>> {
        self.slots
            .lock()
            .expect("scope table lock poisoned")
            .onymous
            .get(location)
            .cloned()
    }

    /// Move the routes of every scope under `from` to the same place under `to`.
    pub fn update(&self, from: &Route, to: &Route) -> usize {
        let slots = self.slots.lock().expect("scope table lock poisoned");
        let mut moved = 0;
        for scope in slots.onymous.values() {
            let Some(route) = scope.route() else { continue };
            if let Some(rebased) = route.rebase(from, to) {
                scope.set_route(Some(rebased));
                moved += 1;
            }
        }
        debug!(%from, %to, moved, "scope routes updated");
        moved
    }

    /// Forget the routes of every scope under `route`.
    pub fn unbind(&self, route: &Route) -> usize {
        let slots = self.slots.lock().expect("scope table lock poisoned");
        let mut unbound = 0;
        for scope in slots.onymous.values() {
            if scope.route().is_some_and(|r| r.derives(route)) {
                scope.set_route(None);
                unbound += 1;
            }
        }
        unbound
    }

    pub fn onymous_count(&self) -> usize {
        self.slots.lock().expect("scope table lock poisoned").onymous.len()
    }

    pub fn anonymous_count(&self) -> usize {
        self.slots
            .lock()
            .expect("scope table lock poisoned")
            .anonymous
            .len()
    }

    pub fn len(&self) -> usize {
        let slots = self.slots.lock().expect("scope table lock poisoned");
        slots.onymous.len() + slots.anonymous.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every scope, marking each defunct.
    pub fn clear(&self) {
        let mut slots = self.slots.lock().expect("scope table lock poisoned");
        for scope in slots.onymous.values().chain(slots.anonymous.values()) {
            scope.mark_defunct();
        }
        slots.onymous.clear();
        slots.anonymous.clear();
    }
}

impl Default for ScopeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScopeTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeTable")
            .field("onymous", &self.onymous_count())
            .field("anonymous", &self.anonymous_count())
            .finish()
    }
}
