//! Flat-file persistence under the database directory.

pub mod allowlist;
pub mod birthdays;
pub mod settings;
pub mod tsv;
pub mod users;

pub use allowlist::AutoEmbedAllowlist;
pub use birthdays::{BirthdayRecord, BirthdayStore};
pub use settings::{Scope, SettingsStore};
pub use users::{LinkedPlatform, PlatformLink, UserRecord, UserRegistry};

use std::path::Path;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("database I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed row at {file}:{line}: {reason}")]
    Malformed {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("user {0} is already registered")]
    AlreadyRegistered(u64),

    #[error("user {0} is not registered")]
    NotRegistered(u64),
}

/// All stores, cloned into every command through `Data`.
#[derive(Clone)]
pub struct Database {
    pub users: UserRegistry,
    pub settings: SettingsStore,
    pub autoembed: AutoEmbedAllowlist,
    pub birthdays: BirthdayStore,
}

impl Database {
    pub fn open(dir: &Path) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(dir)?;
        info!("Database: using directory {}", dir.display());
        Ok(Self {
            users: UserRegistry::new(dir.join("database.csv")),
            settings: SettingsStore::new(dir),
            autoembed: AutoEmbedAllowlist::new(dir),
            birthdays: BirthdayStore::new(dir.join("birthday.csv")),
        })
    }
}
