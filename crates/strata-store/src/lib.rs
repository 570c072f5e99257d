//! The Depot: block storage behind Strata's semantic layer.
//!
//! Objects are represented by two kinds of block:
//!
//! - [`ObjectBlock`] -- mutable, versioned metadata at a stable [`Address`]
//!   (genre, owner, access records, pointer to contents)
//! - [`Contents`] -- immutable payload addressed by its BLAKE3 hash
//!
//! All backends implement the async [`Depot`] trait:
//!
//! - [`InMemoryDepot`] -- `HashMap`-based depot for tests and embedding
//!
//! # Design Rules
//!
//! 1. Content blocks are immutable once written and verified on every read.
//! 2. Object revisions strictly increase at a given address.
//! 3. The depot never interprets payloads beyond decoding them.
//!
//! [`Address`]: strata_types::Address

pub mod block;
pub mod depot;
pub mod error;
pub mod memory;

pub use block::{Contents, ObjectBlock};
pub use depot::Depot;
pub use error::{DepotError, DepotResult};
pub use memory::InMemoryDepot;
