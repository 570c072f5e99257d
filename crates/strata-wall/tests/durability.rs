mod common;

use common::{contents_of, fixture_with};
use strata_wall::{ErrorKind, WallConfig};

#[tokio::test]
async fn wal_is_checkpointed_once_applied() {
    let dir = tempfile::tempdir().unwrap();
    let wal = dir.path().join("journal.wal");
    let config = WallConfig::from_toml_str(&format!(
        "[journal]\nwal_path = {:?}\nsync_mode = \"every_write\"\n",
        wal.display().to_string()
    ))
    .unwrap();
    let fx = fixture_with(config).await;
    assert_eq!(std::fs::metadata(&wal).unwrap().len(), 0);

    let a = fx.wall.load("/f").await.unwrap();
    fx.wall.adjust(a, 4).await.unwrap();
    fx.wall.store(a).await.unwrap();
    fx.wall.flush().await.unwrap();

    assert_eq!(fx.wall.pending(), 0);
    assert_eq!(std::fs::metadata(&wal).unwrap().len(), 0);
    assert_eq!(contents_of(&fx.wall, "/f").await, b"orig");
}

#[tokio::test]
async fn destroyed_object_no_longer_loads() {
    let fx = fixture_with(WallConfig::permissive()).await;
    let a = fx.wall.load("/f").await.unwrap();
    fx.wall.write(a, 0, b"O").await.unwrap();
    fx.wall.destroy(a).await.unwrap();
    fx.wall.flush().await.unwrap();
    let err = fx.wall.load("/f").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LoadFailure);
}
