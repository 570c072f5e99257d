use serde::{Deserialize, Serialize};
use strata_journal::JournalConfig;
use strata_path::ShrubConfig;
use strata_rights::RightsConfig;

use crate::error::WallResult;

/// Configuration for a [`Wall`](crate::Wall), one table per collaborator.
///
/// ```toml
/// [journal]
/// wal_path = "/var/lib/strata/journal.wal"
/// sync_mode = "every_write"
///
/// [shrub]
/// capacity = 4096
///
/// [rights]
/// permissive = false
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    pub journal: JournalConfig,
    pub shrub: ShrubConfig,
    pub rights: RightsConfig,
}

impl WallConfig {
    /// Parse a TOML document; missing tables and keys take their defaults.
    pub fn from_toml_str(text: &str) -> WallResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Defaults with every rights check disabled.
    pub fn permissive() -> Self {
        Self {
            rights: RightsConfig::permissive(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use strata_journal::SyncMode;

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(WallConfig::from_toml_str("").unwrap(), WallConfig::default());
    }

    #[test]
    fn partial_document_overrides_only_given_keys() {
        let config = WallConfig::from_toml_str(
            r#"
            [journal]
            wal_path = "/tmp/strata.wal"
            sync_mode = "every_write"

            [rights]
            permissive = true
            "#,
        )
        .unwrap();
        assert_eq!(config.journal.wal_path, Some(PathBuf::from("/tmp/strata.wal")));
        assert_eq!(config.journal.sync_mode, SyncMode::EveryWrite);
        assert_eq!(config.journal.event_capacity, 1024);
        assert!(config.rights.permissive);
        assert_eq!(config.shrub, ShrubConfig::default());
    }

    #[test]
    fn malformed_document_is_rejected() {
        assert!(WallConfig::from_toml_str("[journal\nwal_path = 3").is_err());
    }
}
