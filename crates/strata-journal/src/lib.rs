//! Journal for Strata.
//!
//! Closing an object produces a [`Transcript`] of depot mutations. The
//! [`Journal`] accepts transcripts without waiting for the depot, persists
//! them in a CRC-framed [`WriteAheadLog`] for crash recovery, and applies
//! them in the background. [`JournaledDepot`] lets readers observe recorded
//! but not yet applied state.

pub mod error;
pub mod journal;
pub mod overlay;
pub mod transcript;
pub mod wal;

pub use error::{JournalError, Result};
pub use journal::{Journal, JournalConfig, JournalEvent, Outcome, Recorded, Retrieved};
pub use overlay::JournaledDepot;
pub use transcript::{Action, Transcript};
pub use wal::{SyncMode, WalEntry, WriteAheadLog};
