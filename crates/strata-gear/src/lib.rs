//! Concurrent object access for Strata.
//!
//! Any number of callers may open the same object at once. Each open yields
//! an [`Identifier`](strata_types::Identifier) naming an [`Actor`]; actors
//! on the same location share one [`Scope`], and through it one
//! [`Context`], so writes by one caller are visible to the others without a
//! reload. Mutations take the scope's write lock, reads its read lock.
//!
//! A caller finishes by declaring a closing [`Operation`](strata_types::Operation).
//! [`validate`] rejects a discard that would roll back changes other actors
//! may have observed. Accepted operations are folded into the context, and
//! when the last actor detaches the scope is sealed and its transcript
//! handed to the [`Journal`](strata_journal::Journal).
//!
//! [`Guard`] ties actor and scope release to control flow so that no error
//! path leaks an attachment.

pub mod actor;
pub mod automaton;
pub mod context;
pub mod error;
pub mod gear;
pub mod guard;
pub mod registry;
pub mod scope;
pub mod table;

pub use actor::{validate, Actor, ActorState};
pub use automaton::Automaton;
pub use context::{Context, ContextState, Information};
pub use error::{ErrorKind, GearError, GearResult};
pub use gear::Gear;
pub use guard::Guard;
pub use registry::ActorRegistry;
pub use scope::{ReadSlot, Scope, Shutdown, WriteSlot};
pub use table::ScopeTable;
