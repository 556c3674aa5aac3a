//! Store configuration

use serde::{Deserialize, Serialize};

/// Connection settings for [`SqliteStore`](crate::SqliteStore)
///
/// Can be embedded in a TOML configuration:
///
/// ```toml
/// [store]
/// busy_timeout_ms = 5000
/// wal = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// How long a writer waits for another writer's transaction to finish
    /// before giving up (milliseconds)
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Use write-ahead logging so readers are not blocked by writers
    /// (ignored by in-memory databases)
    #[serde(default = "default_wal")]
    pub wal: bool,
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_wal() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: default_busy_timeout_ms(),
            wal: default_wal(),
        }
    }
}
