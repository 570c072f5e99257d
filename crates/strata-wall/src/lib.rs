//! Entry points for Strata.
//!
//! [`Wall`] assembles the depot, journal, route resolver, rights layer and
//! access controller into one handle and exposes the filesystem-facing
//! calls: open with [`create`](Wall::create) or [`load`](Wall::load),
//! operate through the returned identifier, and finish with
//! [`discard`](Wall::discard), [`store`](Wall::store) or
//! [`destroy`](Wall::destroy).
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use strata_store::InMemoryDepot;
//! use strata_types::{Genre, Subject};
//! use strata_wall::{Wall, WallConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> strata_wall::WallResult<()> {
//! let subject = Subject::ephemeral();
//! let depot = Arc::new(InMemoryDepot::new());
//! let root = depot.bootstrap_root(subject).expect("bootstrap");
//! let wall = Wall::open(WallConfig::default(), subject, depot, root)?;
//!
//! let file = wall.create(Genre::File).await?;
//! wall.write(file, 0, b"hello").await?;
//! let dir = wall.load("/").await?;
//! wall.add(dir, "greeting", file).await?;
//! wall.store(file).await?;
//! wall.store(dir).await?;
//! wall.flush().await?;
//!
//! let again = wall.load("/greeting").await?;
//! assert_eq!(wall.read(again, 0, 5).await?, b"hello");
//! wall.discard(again).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
mod directory;
pub mod error;
mod file;
mod link;
pub mod telemetry;
mod wall;

pub use config::WallConfig;
pub use error::{WallError, WallResult};
pub use wall::Wall;

pub use strata_gear::{ErrorKind, Guard, Information};
pub use strata_types::{Address, Genre, Identifier, Operation, Subject};
