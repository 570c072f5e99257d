#![allow(dead_code)]

use std::sync::Arc;

use strata_store::InMemoryDepot;
use strata_types::{Address, Genre, Identifier, Subject};
use strata_wall::{Wall, WallConfig};

pub const ORIGINAL: &[u8] = b"original";

pub struct Fixture {
    pub wall: Wall,
    pub depot: Arc<InMemoryDepot>,
    pub subject: Subject,
    pub root: Address,
}

impl Fixture {
    /// A second wall over the same depot acting as another subject.
    pub fn stranger(&self) -> Wall {
        let subject = Subject::from_public_key(&[99u8; 32]);
        Wall::open(WallConfig::default(), subject, self.depot.clone(), self.root).unwrap()
    }

    /// A second wall over the same depot acting as the same subject.
    pub fn reopen(&self, config: WallConfig) -> Wall {
        Wall::open(config, self.subject, self.depot.clone(), self.root).unwrap()
    }
}

/// A root holding file `/f` (containing [`ORIGINAL`]) and empty directory
/// `/d`, all applied to the depot.
pub async fn fixture() -> Fixture {
    fixture_with(WallConfig::default()).await
}

pub async fn fixture_with(config: WallConfig) -> Fixture {
    strata_wall::telemetry::init_with("warn");
    let subject = Subject::from_public_key(&[42u8; 32]);
    let depot = Arc::new(InMemoryDepot::new());
    let root = depot.bootstrap_root(subject).unwrap();
    let wall = Wall::open(config, subject, depot.clone(), root).unwrap();

    let dir = wall.load("/").await.unwrap();
    let f = wall.create(Genre::File).await.unwrap();
    wall.write(f, 0, ORIGINAL).await.unwrap();
    wall.add(dir, "f", f).await.unwrap();
    let d = wall.create(Genre::Directory).await.unwrap();
    wall.add(dir, "d", d).await.unwrap();

    wall.store(f).await.unwrap();
    wall.store(d).await.unwrap();
    wall.store(dir).await.unwrap();
    wall.flush().await.unwrap();

    Fixture {
        wall,
        depot,
        subject,
        root,
    }
}

/// Full contents of the file at `path`, read through a throwaway actor.
pub async fn contents_of(wall: &Wall, path: &str) -> Vec<u8> {
    let id = wall.load(path).await.unwrap();
    let size = wall.information(id).await.unwrap().size;
    let data = wall.read(id, 0, size).await.unwrap();
    wall.discard(id).await.unwrap();
    data
}

pub fn same_scope(wall: &Wall, a: Identifier, b: Identifier) -> bool {
    let scope_a = wall.gear().scope_of(a).unwrap();
    let scope_b = wall.gear().scope_of(b).unwrap();
    Arc::ptr_eq(&scope_a, &scope_b)
}
